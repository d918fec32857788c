//! Design request API handlers.
//!
//! ```text
//! POST /api/v1/applications {"title":"...","categoryId":"...","image":{...}}
//! GET /api/v1/applications?status=new&category=...&q=poster
//! GET /api/v1/applications/{id}
//! DELETE /api/v1/applications/{id}
//! POST /api/v1/applications/{id}/transition {"status":"in_progress","comment":"..."}
//! PUT /api/v1/applications/{id}/favorite {"favorite":true}
//! GET /api/v1/applications/{id}/image
//! GET /api/v1/applications/{id}/design-image
//! ```
//!
//! Who may see or change what is decided by the domain; handlers only parse
//! input, resolve the caller and shape responses.

use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::ports::{ImageRole, SubmitApplicationRequest, TransitionRequest};
use crate::domain::{Error, Principal, WorkflowError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_application_id, parse_category_id, parse_description, parse_status,
    parse_title,
};

#[path = "applications_dto.rs"]
mod dto;

pub use dto::{
    ApplicationResponse, ApplicationStatusDto, CreateApplicationRequest, FavoriteRequest,
    ImagePayload, ListApplicationsQuery, TransitionRequestBody,
};

async fn principal(state: &HttpState, session: &SessionContext) -> Result<Principal, Error> {
    session.require_principal(state.profile.as_ref()).await
}

/// Submit a design request with its reference image.
#[utoipa::path(
    post,
    path = "/api/v1/applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application created", body = ApplicationResponse),
        (status = 400, description = "Invalid field, image or category", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "createApplication"
)]
#[post("/applications")]
pub async fn create_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateApplicationRequest>,
) -> ApiResult<HttpResponse> {
    let actor = principal(&state, &session).await?;
    let body = payload.into_inner();
    let request = SubmitApplicationRequest {
        actor,
        title: parse_title(&body.title)?,
        description: parse_description(&body.description)?,
        category: parse_category_id(&body.category_id, FieldName::new("categoryId"))?,
        image: body.image.decode(FieldName::new("image"))?,
    };
    let application = state.applications.submit(request).await?;
    Ok(HttpResponse::Created().json(ApplicationResponse::from(&application)))
}

/// List applications visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/applications",
    params(ListApplicationsQuery),
    responses(
        (status = 200, description = "Matching applications", body = [ApplicationResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "listApplications"
)]
#[get("/applications")]
pub async fn list_applications(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListApplicationsQuery>,
) -> ApiResult<web::Json<Vec<ApplicationResponse>>> {
    let actor = principal(&state, &session).await?;
    let filter = query.into_inner().into_filter()?;
    let applications = state.applications_query.list(&actor, filter).await?;
    Ok(web::Json(
        applications.iter().map(ApplicationResponse::from).collect(),
    ))
}

/// Fetch one application.
///
/// Applications owned by someone else are reported as missing.
#[utoipa::path(
    get,
    path = "/api/v1/applications/{id}",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 200, description = "Application", body = ApplicationResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "getApplication"
)]
#[get("/applications/{id}")]
pub async fn get_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ApplicationResponse>> {
    let actor = principal(&state, &session).await?;
    let id = parse_application_id(&path.into_inner())?;
    let application = state.applications_query.fetch(&actor, &id).await?;
    Ok(web::Json(ApplicationResponse::from(&application)))
}

/// Withdraw an application that is still `new`. Applicant only.
#[utoipa::path(
    delete,
    path = "/api/v1/applications/{id}",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not the applicant", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema),
        (status = 409, description = "Application is already in review", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "deleteApplication"
)]
#[delete("/applications/{id}")]
pub async fn delete_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = principal(&state, &session).await?;
    let id = parse_application_id(&path.into_inner())?;
    state.applications.withdraw(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Move an application along the review workflow. Staff only.
///
/// `in_progress` requires a comment; `done` requires a design image, either
/// supplied here or attached earlier. Once an application has left `new` it
/// can only move forward.
#[utoipa::path(
    post,
    path = "/api/v1/applications/{id}/transition",
    params(("id" = String, Path, description = "Application identifier")),
    request_body = TransitionRequestBody,
    responses(
        (status = 200, description = "Updated application", body = ApplicationResponse),
        (status = 400, description = "Missing comment or design image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not staff", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema),
        (status = 409, description = "Status is locked", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "transitionApplication"
)]
#[post("/applications/{id}/transition")]
pub async fn transition_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TransitionRequestBody>,
) -> ApiResult<web::Json<ApplicationResponse>> {
    let actor = principal(&state, &session).await?;
    if !actor.can_review() {
        return Err(WorkflowError::Unauthorized.into());
    }
    let id = parse_application_id(&path.into_inner())?;
    let body = payload.into_inner();
    let request = TransitionRequest {
        actor,
        id,
        status: parse_status(&body.status, FieldName::new("status"))?,
        comment: body.comment,
        design_image: body
            .design_image
            .map(|image| image.decode(FieldName::new("designImage")))
            .transpose()?,
    };
    let application = state.applications.transition(request).await?;
    Ok(web::Json(ApplicationResponse::from(&application)))
}

/// Mark or unmark an application as a favourite.
#[utoipa::path(
    put,
    path = "/api/v1/applications/{id}/favorite",
    params(("id" = String, Path, description = "Application identifier")),
    request_body = FavoriteRequest,
    responses(
        (status = 200, description = "Updated application", body = ApplicationResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "setFavorite"
)]
#[put("/applications/{id}/favorite")]
pub async fn set_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<FavoriteRequest>,
) -> ApiResult<web::Json<ApplicationResponse>> {
    let actor = principal(&state, &session).await?;
    let id = parse_application_id(&path.into_inner())?;
    let application = state
        .applications
        .set_favorite(&actor, &id, payload.favorite)
        .await?;
    Ok(web::Json(ApplicationResponse::from(&application)))
}

async fn image_response(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    role: ImageRole,
) -> ApiResult<HttpResponse> {
    let actor = principal(state, session).await?;
    let id = parse_application_id(raw_id)?;
    let image = state.applications_query.image(&actor, &id, role).await?;
    Ok(HttpResponse::Ok()
        .content_type(image.kind.content_type())
        .insert_header(CacheControl(vec![
            CacheDirective::Private,
            CacheDirective::NoCache,
        ]))
        .body(image.bytes))
}

/// Download the applicant's reference image.
#[utoipa::path(
    get,
    path = "/api/v1/applications/{id}/image",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 200, description = "Image bytes", body = String, content_type = "image/*"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such application or image", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "getApplicationImage"
)]
#[get("/applications/{id}/image")]
pub async fn get_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    image_response(&state, &session, &path, ImageRole::Reference).await
}

/// Download the finished design.
#[utoipa::path(
    get,
    path = "/api/v1/applications/{id}/design-image",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 200, description = "Image bytes", body = String, content_type = "image/*"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No design attached yet", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "getDesignImage"
)]
#[get("/applications/{id}/design-image")]
pub async fn get_design_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    image_response(&state, &session, &path, ImageRole::Design).await
}

#[cfg(test)]
#[path = "applications_tests.rs"]
mod tests;
