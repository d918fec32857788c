//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};

use crate::domain::ports::{
    MockApplicationCommand, MockApplicationQuery, MockCategoryCommand, MockCategoryQuery,
    MockLoginService, MockRegistrationCommand, MockUserProfileQuery,
};
use crate::domain::{EmailAddress, Error, PersonName, User, UserDraft, UserId, Username};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::users::LoginRequest;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocked driving ports. Any call without an expectation fails the test.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub registration: MockRegistrationCommand,
    pub profile: MockUserProfileQuery,
    pub categories: MockCategoryCommand,
    pub categories_query: MockCategoryQuery,
    pub applications: MockApplicationCommand,
    pub applications_query: MockApplicationQuery,
}

impl MockPorts {
    /// Ports where any password logs in as `user` and the profile lookup
    /// resolves their id.
    pub fn signed_in(user: &User) -> Self {
        let mut ports = Self::default();
        let login_user = user.clone();
        ports
            .login
            .expect_authenticate()
            .returning(move |_| Ok(login_user.clone()));
        let profile_user = user.clone();
        ports
            .profile
            .expect_fetch_profile()
            .returning(move |id| {
                if id == profile_user.id() {
                    Ok(profile_user.clone())
                } else {
                    Err(Error::not_found("user not found"))
                }
            });
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            registration: Arc::new(self.registration),
            profile: Arc::new(self.profile),
            categories: Arc::new(self.categories),
            categories_query: Arc::new(self.categories_query),
            applications: Arc::new(self.applications),
            applications_query: Arc::new(self.applications_query),
        })
    }
}

pub fn sample_user(username: &str, is_staff: bool) -> User {
    User::new(UserDraft {
        id: UserId::random(),
        username: Username::new(username).expect("valid username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
        first_name: PersonName::default(),
        last_name: PersonName::default(),
        is_staff,
    })
}

/// The full `/api/v1` scope over the given state.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Log in through `POST /api/v1/login` and return the session cookie.
pub async fn sign_in(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    username: &str,
) -> Cookie<'static> {
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                username: username.to_owned(),
                password: "password".to_owned(),
            })
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
