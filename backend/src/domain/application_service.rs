//! Application domain service.
//!
//! Combines the access policy, the workflow rules and the storage ports.
//! Images are written before the row; if the row write fails or the
//! workflow refuses the change, the freshly written image is removed again.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, ApplicationRepository, ApplicationRepositoryError,
    CategoryRepository, CategoryRepositoryError, ImageRole, ImageStore, ImageStoreError, RawImage,
    SubmitApplicationRequest, TransitionRequest,
};
use crate::domain::{
    Application, ApplicationFilter, ApplicationId, Comment, Error, ImageArea, ImageLocation,
    ImageUpload, NewApplication, Principal, StoredImage, TransitionCommand, WorkflowError,
};

/// Application service implementing the application driving ports.
#[derive(Clone)]
pub struct ApplicationService<A, C, S> {
    applications: Arc<A>,
    categories: Arc<C>,
    images: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<A, C, S> ApplicationService<A, C, S> {
    pub fn new(
        applications: Arc<A>,
        categories: Arc<C>,
        images: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            applications,
            categories,
            images,
            clock,
        }
    }
}

fn storage(message: String, retryable: bool) -> Error {
    WorkflowError::Storage { message, retryable }.into()
}

fn map_application_error(error: ApplicationRepositoryError) -> Error {
    match error {
        ApplicationRepositoryError::Connection { message } => {
            storage(format!("application repository unavailable: {message}"), true)
        }
        ApplicationRepositoryError::Query { message } => {
            storage(format!("application repository error: {message}"), false)
        }
        ApplicationRepositoryError::NotFound { id } => {
            Error::not_found(format!("application {id} not found"))
        }
        ApplicationRepositoryError::UnknownCategory => WorkflowError::InvalidCategory.into(),
        ApplicationRepositoryError::Rejected { reason } => reason.into(),
    }
}

fn map_category_error(error: CategoryRepositoryError) -> Error {
    match error {
        CategoryRepositoryError::Connection { message } => {
            storage(format!("category repository unavailable: {message}"), true)
        }
        other => storage(format!("category lookup failed: {other}"), false),
    }
}

fn map_image_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::Unavailable { message } => {
            storage(format!("image store unavailable: {message}"), true)
        }
        ImageStoreError::Io { message } => storage(format!("image store error: {message}"), false),
    }
}

fn validate_upload(raw: RawImage) -> Result<ImageUpload, Error> {
    ImageUpload::new(&raw.content_type, raw.bytes).map_err(|err| {
        debug!(error = %err, "upload rejected");
        Error::from(WorkflowError::from(err))
    })
}

fn hidden(id: &ApplicationId) -> Error {
    Error::not_found(format!("application {id} not found"))
}

impl<A, C, S> ApplicationService<A, C, S>
where
    A: ApplicationRepository,
    C: CategoryRepository,
    S: ImageStore,
{
    async fn discard(&self, location: &ImageLocation) {
        if let Err(err) = self.images.remove(location).await {
            warn!(%location, error = %err, "failed to remove orphaned image");
        }
    }

    /// Load an application the actor is allowed to see.
    async fn visible(&self, actor: &Principal, id: &ApplicationId) -> Result<Application, Error> {
        let application = self
            .applications
            .find_by_id(id)
            .await
            .map_err(map_application_error)?
            .ok_or_else(|| hidden(id))?;
        if !actor.can_read(application.applicant()) {
            debug!(application_id = %id, user_id = %actor.user_id(), "read refused");
            return Err(hidden(id));
        }
        Ok(application)
    }
}

#[async_trait]
impl<A, C, S> ApplicationCommand for ApplicationService<A, C, S>
where
    A: ApplicationRepository,
    C: CategoryRepository,
    S: ImageStore,
{
    async fn submit(&self, request: SubmitApplicationRequest) -> Result<Application, Error> {
        let SubmitApplicationRequest {
            actor,
            title,
            description,
            category,
            image,
        } = request;
        let upload = validate_upload(image)?;

        if self
            .categories
            .find_by_id(&category)
            .await
            .map_err(map_category_error)?
            .is_none()
        {
            debug!(category_id = %category, "submission names an unknown category");
            return Err(WorkflowError::InvalidCategory.into());
        }

        let location = self
            .images
            .store(ImageArea::Applications, &upload)
            .await
            .map_err(map_image_error)?;

        let application = Application::submit(NewApplication {
            id: ApplicationId::random(),
            applicant: actor.user_id().clone(),
            title,
            description,
            category,
            image: location.clone(),
            created_at: self.clock.utc(),
        });
        if let Err(err) = self.applications.insert(&application).await {
            self.discard(&location).await;
            return Err(map_application_error(err));
        }
        info!(
            application_id = %application.id(),
            user_id = %actor.user_id(),
            "application submitted"
        );
        Ok(application)
    }

    async fn transition(&self, request: TransitionRequest) -> Result<Application, Error> {
        let TransitionRequest {
            actor,
            id,
            status,
            comment,
            design_image,
        } = request;
        if !actor.can_review() {
            debug!(application_id = %id, user_id = %actor.user_id(), "transition refused for non-staff");
            return Err(WorkflowError::Unauthorized.into());
        }
        let upload = design_image.map(validate_upload).transpose()?;

        let stored_design = match upload {
            Some(upload) => Some(
                self.images
                    .store(ImageArea::Designs, &upload)
                    .await
                    .map_err(map_image_error)?,
            ),
            None => None,
        };

        let command = TransitionCommand {
            requested: status,
            comment: Comment::optional(comment.as_deref()),
            design_image: stored_design.clone(),
            actor,
        };
        match self.applications.transition(&id, &command).await {
            Ok(outcome) => {
                if let Some(replaced) = &outcome.replaced_design {
                    self.discard(replaced).await;
                }
                info!(
                    application_id = %id,
                    status = %outcome.application.status(),
                    user_id = %command.actor.user_id(),
                    "application transitioned"
                );
                Ok(outcome.application)
            }
            Err(err) => {
                if let Some(location) = &stored_design {
                    self.discard(location).await;
                }
                if let ApplicationRepositoryError::Rejected { reason } = &err {
                    debug!(application_id = %id, code = reason.code(), "transition rejected");
                }
                Err(map_application_error(err))
            }
        }
    }

    async fn withdraw(&self, actor: &Principal, id: &ApplicationId) -> Result<(), Error> {
        self.visible(actor, id).await?;
        let removed = self
            .applications
            .delete(id, actor)
            .await
            .map_err(|err| {
                if let ApplicationRepositoryError::Rejected { reason } = &err {
                    debug!(application_id = %id, code = reason.code(), "withdrawal rejected");
                }
                map_application_error(err)
            })?;
        self.discard(removed.image()).await;
        if let Some(design) = removed.design_image() {
            self.discard(design).await;
        }
        info!(application_id = %id, user_id = %actor.user_id(), "application withdrawn");
        Ok(())
    }

    async fn set_favorite(
        &self,
        actor: &Principal,
        id: &ApplicationId,
        favorite: bool,
    ) -> Result<Application, Error> {
        let application = self.visible(actor, id).await?;
        if !actor.can_toggle_favorite(application.applicant()) {
            return Err(WorkflowError::Unauthorized.into());
        }
        self.applications
            .set_favorite(id, favorite)
            .await
            .map_err(map_application_error)
    }
}

#[async_trait]
impl<A, C, S> ApplicationQuery for ApplicationService<A, C, S>
where
    A: ApplicationRepository,
    C: CategoryRepository,
    S: ImageStore,
{
    async fn list(
        &self,
        actor: &Principal,
        mut filter: ApplicationFilter,
    ) -> Result<Vec<Application>, Error> {
        if !actor.is_staff() {
            filter.applicant = Some(actor.user_id().clone());
        }
        self.applications
            .list(&filter)
            .await
            .map_err(map_application_error)
    }

    async fn fetch(&self, actor: &Principal, id: &ApplicationId) -> Result<Application, Error> {
        self.visible(actor, id).await
    }

    async fn image(
        &self,
        actor: &Principal,
        id: &ApplicationId,
        role: ImageRole,
    ) -> Result<StoredImage, Error> {
        let application = self.visible(actor, id).await?;
        let location = match role {
            ImageRole::Reference => application.image().clone(),
            ImageRole::Design => application
                .design_image()
                .cloned()
                .ok_or_else(|| Error::not_found(format!("application {id} has no design image")))?,
        };
        self.images
            .load(&location)
            .await
            .map_err(map_image_error)?
            .ok_or_else(|| Error::not_found(format!("image {location} is missing")))
    }
}

#[cfg(test)]
#[path = "application_service_tests.rs"]
mod tests;
