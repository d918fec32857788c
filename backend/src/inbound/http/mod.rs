//! HTTP inbound adapter exposing REST endpoints.

pub mod applications;
pub mod categories;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Largest accepted JSON body. Base64 inflates images by a third, so this
/// leaves room for an image above the domain's upload cap to be rejected
/// with a field error rather than a bare payload error.
pub const JSON_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Register every `/api/v1` handler and the JSON extractor configuration.
///
/// Mount inside a scope wrapped with the session middleware.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(error::json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
    .service(users::register)
    .service(users::login)
    .service(users::logout)
    .service(users::current_user)
    .service(categories::list_categories)
    .service(categories::create_category)
    .service(categories::delete_category)
    .service(applications::create_application)
    .service(applications::list_applications)
    .service(applications::get_application)
    .service(applications::delete_application)
    .service(applications::transition_application)
    .service(applications::set_favorite)
    .service(applications::get_image)
    .service(applications::get_design_image);
}
