//! Account domain service: registration, login and profile lookups.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::password::DEFAULT_ROUNDS;
use crate::domain::ports::{
    LoginService, RegistrationCommand, StoredCredentials, UserPersistenceError, UserProfileQuery,
    UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, PasswordDigest, Registration, RegistrationValidationError, User,
    UserDraft, UserId, Username,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the login, registration and profile ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    password_rounds: u32,
}

impl<U> AccountService<U> {
    /// Create a service that stretches passwords with the default round count.
    pub fn new(users: Arc<U>) -> Self {
        Self {
            users,
            password_rounds: DEFAULT_ROUNDS,
        }
    }

    /// Override the stretching rounds used for new digests.
    pub fn with_password_rounds(mut self, rounds: u32) -> Self {
        self.password_rounds = rounds.max(1);
        self
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername => {
            registration_error(&RegistrationValidationError::UsernameTaken)
        }
        UserPersistenceError::DuplicateEmail => {
            registration_error(&RegistrationValidationError::EmailTaken)
        }
    }
}

/// Render a registration failure as a field-level invalid request.
pub fn registration_error(error: &RegistrationValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field().as_str(),
        "code": error.code(),
    }))
}

async fn blocking<T, F>(work: F) -> Result<T, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| Error::internal(format!("password worker failed: {err}")))
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    /// Create an account with an explicit staff flag.
    ///
    /// Public registration always passes `false`; operators provision staff
    /// accounts through the `create-staff` binary.
    pub async fn create_account(
        &self,
        registration: &Registration,
        is_staff: bool,
    ) -> Result<User, Error> {
        let password = Zeroizing::new(registration.password().to_owned());
        let rounds = self.password_rounds;
        let digest =
            blocking(move || PasswordDigest::derive_with_rounds(password.as_str(), rounds)).await?;

        let user = User::new(UserDraft {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            first_name: registration.first_name().clone(),
            last_name: registration.last_name().clone(),
            is_staff,
        });
        self.users
            .insert(&user, &digest)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), is_staff, "account created");
        Ok(user)
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(StoredCredentials { user, digest }) = self
            .users
            .find_credentials(&username)
            .await
            .map_err(map_user_error)?
        else {
            debug!("login for unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        let verified = blocking(move || digest.verify(password.as_str())).await?;
        if !verified {
            debug!(user_id = %user.id(), "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user)
    }
}

#[async_trait]
impl<U> RegistrationCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        self.create_account(registration, false).await
    }
}

#[async_trait]
impl<U> UserProfileQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
