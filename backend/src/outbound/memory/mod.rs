//! In-process adapters for running without PostgreSQL.
//!
//! [`MemoryStore`] keeps users, categories and applications behind one
//! mutex so listings can search applicant usernames and transitions stay
//! atomic. [`MemoryImageStore`] keeps uploaded bytes in a map. Both are used
//! by the server when no database is configured and by integration tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    ApplicationRepository, ApplicationRepositoryError, CategoryRepository,
    CategoryRepositoryError, ImageStore, ImageStoreError, StoredCredentials,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Application, ApplicationFilter, ApplicationId, Category, CategoryId, ImageArea,
    ImageLocation, ImageUpload, PasswordDigest, Principal, StoredImage, TransitionCommand,
    TransitionOutcome, User, UserId, Username, apply_transition, check_deletion,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, StoredCredentials>,
    categories: HashMap<CategoryId, Category>,
    applications: HashMap<ApplicationId, Application>,
}

impl State {
    fn username_of(&self, id: &UserId) -> Option<&str> {
        self.users
            .get(id)
            .map(|stored| stored.user.username().as_ref())
    }

    fn matches(&self, application: &Application, filter: &ApplicationFilter) -> bool {
        if filter
            .applicant
            .as_ref()
            .is_some_and(|applicant| applicant != application.applicant())
        {
            return false;
        }
        if filter
            .status
            .is_some_and(|status| status != application.status())
        {
            return false;
        }
        if filter
            .category
            .is_some_and(|category| category != application.category())
        {
            return false;
        }
        let Some(text) = filter.search_text() else {
            return true;
        };
        let needle = text.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        contains(application.title().as_ref())
            || contains(application.description().as_ref())
            || self
                .username_of(application.applicant())
                .is_some_and(contains)
    }
}

/// Shared in-memory implementation of the three repository ports.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "memory store lock poisoned".to_owned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(
        &self,
        user: &User,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let existing = state.users.values().map(|stored| &stored.user);
        for other in existing {
            if other.username() == user.username() {
                return Err(UserPersistenceError::duplicate_username());
            }
            if other.email() == user.email() {
                return Err(UserPersistenceError::duplicate_email());
            }
        }
        state.users.insert(
            user.id().clone(),
            StoredCredentials {
                user: user.clone(),
                digest: digest.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.username() == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        let state = self.lock().map_err(CategoryRepositoryError::query)?;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name().as_ref().cmp(b.name().as_ref()));
        Ok(categories)
    }

    async fn find_by_id(
        &self,
        id: &CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let state = self.lock().map_err(CategoryRepositoryError::query)?;
        Ok(state.categories.get(id).cloned())
    }

    async fn insert(&self, category: &Category) -> Result<(), CategoryRepositoryError> {
        let mut state = self.lock().map_err(CategoryRepositoryError::query)?;
        if state
            .categories
            .values()
            .any(|existing| existing.name() == category.name())
        {
            return Err(CategoryRepositoryError::duplicate_name(
                category.name().as_ref(),
            ));
        }
        state.categories.insert(category.id(), category.clone());
        Ok(())
    }

    async fn delete(&self, id: &CategoryId) -> Result<bool, CategoryRepositoryError> {
        let mut state = self.lock().map_err(CategoryRepositoryError::query)?;
        if state
            .applications
            .values()
            .any(|application| application.category() == *id)
        {
            return Err(CategoryRepositoryError::in_use(id.to_string()));
        }
        Ok(state.categories.remove(id).is_some())
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn insert(&self, application: &Application) -> Result<(), ApplicationRepositoryError> {
        let mut state = self.lock().map_err(ApplicationRepositoryError::query)?;
        if !state.categories.contains_key(&application.category()) {
            return Err(ApplicationRepositoryError::unknown_category());
        }
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        let state = self.lock().map_err(ApplicationRepositoryError::query)?;
        Ok(state.applications.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let state = self.lock().map_err(ApplicationRepositoryError::query)?;
        let mut found: Vec<Application> = state
            .applications
            .values()
            .filter(|application| state.matches(application, filter))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(a.id().as_uuid()))
        });
        Ok(found)
    }

    async fn transition(
        &self,
        id: &ApplicationId,
        command: &TransitionCommand,
    ) -> Result<TransitionOutcome, ApplicationRepositoryError> {
        let mut state = self.lock().map_err(ApplicationRepositoryError::query)?;
        let slot = state
            .applications
            .get_mut(id)
            .ok_or_else(|| ApplicationRepositoryError::not_found(id.to_string()))?;
        let updated = apply_transition(slot, command).map_err(ApplicationRepositoryError::rejected)?;
        let outcome = TransitionOutcome::between(slot, updated);
        *slot = outcome.application.clone();
        Ok(outcome)
    }

    async fn delete(
        &self,
        id: &ApplicationId,
        actor: &Principal,
    ) -> Result<Application, ApplicationRepositoryError> {
        let mut state = self.lock().map_err(ApplicationRepositoryError::query)?;
        let current = state
            .applications
            .get(id)
            .ok_or_else(|| ApplicationRepositoryError::not_found(id.to_string()))?;
        check_deletion(current, actor).map_err(ApplicationRepositoryError::rejected)?;
        state
            .applications
            .remove(id)
            .ok_or_else(|| ApplicationRepositoryError::not_found(id.to_string()))
    }

    async fn set_favorite(
        &self,
        id: &ApplicationId,
        favorite: bool,
    ) -> Result<Application, ApplicationRepositoryError> {
        let mut state = self.lock().map_err(ApplicationRepositoryError::query)?;
        let slot = state
            .applications
            .get_mut(id)
            .ok_or_else(|| ApplicationRepositoryError::not_found(id.to_string()))?;
        *slot = slot.clone().with_favorite(favorite);
        Ok(slot.clone())
    }
}

/// Image store holding uploads in memory.
#[derive(Default)]
pub struct MemoryImageStore {
    images: Mutex<HashMap<String, StoredImage>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredImage>>, ImageStoreError> {
        self.images
            .lock()
            .map_err(|_| ImageStoreError::unavailable("image map lock poisoned"))
    }

    /// Number of images currently held.
    pub fn len(&self) -> usize {
        self.images.lock().map(|images| images.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store(
        &self,
        area: ImageArea,
        upload: &ImageUpload,
    ) -> Result<ImageLocation, ImageStoreError> {
        let location = ImageLocation::generate(area, upload.kind());
        self.lock()?.insert(
            location.to_string(),
            StoredImage {
                kind: upload.kind(),
                bytes: upload.bytes().to_vec(),
            },
        );
        Ok(location)
    }

    async fn load(&self, location: &ImageLocation) -> Result<Option<StoredImage>, ImageStoreError> {
        Ok(self.lock()?.get(location.as_ref()).cloned())
    }

    async fn remove(&self, location: &ImageLocation) -> Result<(), ImageStoreError> {
        self.lock()?.remove(location.as_ref());
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
