//! Category API handlers.
//!
//! ```text
//! GET /api/v1/categories
//! POST /api/v1/categories {"name":"Posters"}
//! DELETE /api/v1/categories/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Category, CategoryName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, category_name_error, parse_category_id};

/// Request body for `POST /api/v1/categories`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[schema(example = "Posters")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id().to_string(),
            name: category.name().as_ref().to_owned(),
        }
    }
}

/// List every category, ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Category store unavailable", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    session.require_principal(state.profile.as_ref()).await?;
    let categories = state.categories_query.list().await?;
    Ok(web::Json(
        categories.iter().map(CategoryResponse::from).collect(),
    ))
}

/// Create a category. Staff only.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid or duplicate name", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not staff", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_principal(state.profile.as_ref()).await?;
    let name = CategoryName::new(&payload.name).map_err(|err| category_name_error(&err))?;
    let category = state.categories.create(&actor, name).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(&category)))
}

/// Delete a category no application refers to. Staff only.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not staff", body = ErrorSchema),
        (status = 404, description = "No such category", body = ErrorSchema),
        (status = 409, description = "Category still in use", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_principal(state.profile.as_ref()).await?;
    let id = parse_category_id(&path.into_inner(), FieldName::new("id"))?;
    state.categories.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
