//! Builders wiring adapters into the domain services behind [`HttpState`].
//!
//! With a database pool the Diesel repositories back every port; without
//! one a single [`MemoryStore`] does. Images go to [`LocalImageStore`] when a
//! media root is known and to [`MemoryImageStore`] otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use design_desk::domain::ports::{
    ApplicationRepository, CategoryRepository, ImageStore, UserRepository,
};
use design_desk::domain::{AccountService, ApplicationService, CategoryService};
use design_desk::inbound::http::state::{HttpState, HttpStatePorts};
use design_desk::outbound::memory::{MemoryImageStore, MemoryStore};
use design_desk::outbound::persistence::{
    DieselApplicationRepository, DieselCategoryRepository, DieselUserRepository,
};
use design_desk::outbound::storage::LocalImageStore;

use super::ServerConfig;

/// Media directory used with PostgreSQL when none is configured.
const DEFAULT_MEDIA_ROOT: &str = "media";

struct Repositories<U, C, A> {
    users: Arc<U>,
    categories: Arc<C>,
    applications: Arc<A>,
}

enum Images {
    Local(Arc<LocalImageStore>),
    Memory(Arc<MemoryImageStore>),
}

fn assemble<U, C, A, S>(repos: Repositories<U, C, A>, images: Arc<S>) -> HttpState
where
    U: UserRepository + 'static,
    C: CategoryRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ImageStore + 'static,
{
    let accounts = Arc::new(AccountService::new(repos.users));
    let categories = Arc::new(CategoryService::new(repos.categories.clone()));
    let applications = Arc::new(ApplicationService::new(
        repos.applications,
        repos.categories,
        images,
        Arc::new(DefaultClock),
    ));
    HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        registration: accounts.clone(),
        profile: accounts,
        categories: categories.clone(),
        categories_query: categories,
        applications: applications.clone(),
        applications_query: applications,
    })
}

fn assemble_with_images<U, C, A>(repos: Repositories<U, C, A>, images: Images) -> HttpState
where
    U: UserRepository + 'static,
    C: CategoryRepository + 'static,
    A: ApplicationRepository + 'static,
{
    match images {
        Images::Local(store) => assemble(repos, store),
        Images::Memory(store) => assemble(repos, store),
    }
}

fn open_media_root(root: PathBuf) -> std::io::Result<Images> {
    let store = LocalImageStore::open(&root).map_err(|err| {
        std::io::Error::other(format!(
            "failed to open media root {}: {err}",
            root.display()
        ))
    })?;
    info!(media_root = %root.display(), "storing images on disk");
    Ok(Images::Local(Arc::new(store)))
}

/// Build the shared handler state for the configured backends.
///
/// # Errors
/// Fails when the media root cannot be created or opened.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let state = match &config.db_pool {
        Some(pool) => {
            let root = config
                .media_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT));
            let repos = Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
                applications: Arc::new(DieselApplicationRepository::new(pool.clone())),
            };
            assemble_with_images(repos, open_media_root(root)?)
        }
        None => {
            warn!("no database configured; data will not survive a restart");
            let store = Arc::new(MemoryStore::new());
            let repos = Repositories {
                users: store.clone(),
                categories: store.clone(),
                applications: store,
            };
            let images = match config.media_root.clone() {
                Some(root) => open_media_root(root)?,
                None => Images::Memory(Arc::new(MemoryImageStore::new())),
            };
            assemble_with_images(repos, images)
        }
    };
    Ok(web::Data::new(state))
}
