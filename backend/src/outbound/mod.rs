//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories and image store for database-less runs
//! - **storage**: filesystem image store rooted at the media directory
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations.

pub mod memory;
pub mod persistence;
pub mod storage;
