//! Rule-by-rule checks of the lint.

use rstest::rstest;

use super::*;

fn lint_one(file: &str, contents: &str) -> Result<(), LintError> {
    lint_sources(&[LintSource::new(file, contents)])
}

fn rules_broken(file: &str, contents: &str) -> Vec<RuleId> {
    match lint_one(file, contents) {
        Ok(()) => Vec::new(),
        Err(LintError::Violations(found)) => found.0.into_iter().map(|v| v.rule).collect(),
        Err(other) => panic!("lint failed to run: {other}"),
    }
}

#[rstest]
#[case(
    "inbound/http/applications.rs",
    "use design_desk::outbound::memory::MemoryStore; fn handler() {}"
)]
#[case(
    "inbound/http/categories.rs",
    "fn handler() { let _ = crate::outbound::persistence::DbPool::new; }"
)]
#[case("domain/application_service.rs", "use super::super::inbound::http::HttpState;")]
#[case("domain/access.rs", "use crate::outbound::storage::LocalImageStore;")]
#[case("outbound/memory/mod.rs", "use crate::inbound::http::state::HttpState;")]
fn sibling_layers_are_off_limits(#[case] file: &str, #[case] contents: &str) {
    assert_eq!(rules_broken(file, contents), [RuleId::LayerDependency]);
}

#[rstest]
#[case("domain/application/image.rs", "use cap_std::fs::Dir;")]
#[case("domain/category.rs", "fn document() -> utoipa::openapi::OpenApi { todo!() }")]
#[case("domain/user.rs", "fn f() -> actix_web::HttpResponse { todo!() }")]
#[case("inbound/http/applications.rs", "use diesel::prelude::*;")]
#[case("outbound/storage/mod.rs", "use actix_web::web::Bytes;")]
#[case("outbound/persistence/models.rs", "use utoipa::ToSchema;")]
fn reserved_crates_stay_in_their_layer(#[case] file: &str, #[case] contents: &str) {
    assert_eq!(rules_broken(file, contents), [RuleId::ExternalCrate]);
}

#[rstest]
#[case("domain/application_service.rs", "fn f() { apply_transition(&app, &cmd); }")]
#[case(
    "domain/application_service.rs",
    "fn f() { crate::domain::check_deletion(&app, &actor); }"
)]
#[case("inbound/http/applications.rs", "fn f() { apply_transition(&app, &cmd); }")]
fn workflow_rules_run_only_under_the_row_lock(#[case] file: &str, #[case] contents: &str) {
    assert_eq!(rules_broken(file, contents), [RuleId::LockedWorkflow]);
}

#[rstest]
#[case("outbound/memory/mod.rs")]
#[case("outbound/persistence/diesel_application_repository.rs")]
#[case("domain/application/workflow.rs")]
fn repositories_and_the_workflow_module_may_evaluate_rules(#[case] file: &str) {
    let body = "use crate::domain::{apply_transition, check_deletion};
        fn f() { apply_transition(&app, &cmd); check_deletion(&app, &actor); }";
    assert_eq!(lint_one(file, body).ok(), Some(()));
}

#[rstest]
fn re_exporting_the_workflow_is_not_a_call() {
    assert!(
        lint_one(
            "domain/mod.rs",
            "pub use self::application::{apply_transition, check_deletion};"
        )
        .is_ok()
    );
}

#[rstest]
#[case("inbound/http/applications_dto.rs", true)]
#[case("domain/application_service.rs", true)]
#[case("outbound/persistence/models.rs", false)]
#[case("domain/application/model.rs", false)]
fn only_adapters_rebuild_stored_applications(#[case] file: &str, #[case] flagged: bool) {
    let broken = rules_broken(file, "fn f() { let _ = Application::restore(record); }");
    assert_eq!(broken.contains(&RuleId::Rehydration), flagged, "{broken:?}");
}

#[rstest]
#[case("use crate::domain::ports::ApplicationRepository;")]
#[case("fn f(store: &dyn ImageStore) {}")]
#[case("struct State { users: std::sync::Arc<dyn crate::domain::ports::UserRepository> }")]
fn handlers_never_see_driven_ports(#[case] contents: &str) {
    assert_eq!(
        rules_broken("inbound/http/state.rs", contents),
        [RuleId::DrivenPortInInbound]
    );
}

#[rstest]
#[case("use crate::domain::ports::CategoryCommand;")]
#[case("impl LoginService for MemoryStore {}")]
fn adapters_never_implement_use_cases(#[case] contents: &str) {
    assert_eq!(
        rules_broken("outbound/memory/mod.rs", contents),
        [RuleId::DrivingPortInOutbound]
    );
}

#[rstest]
#[case(
    "inbound/http/applications_tests.rs",
    "use crate::domain::ports::MockApplicationRepository; fn f() { apply_transition(&a, &c); }"
)]
#[case("domain/application_service_tests.rs", "fn f() { let _ = Application::restore(record); }")]
#[case(
    "inbound/http/applications.rs",
    "#[cfg(test)] mod tests { fn f(_: &dyn ImageStore) { apply_transition(&a, &c); } }"
)]
fn placement_rules_skip_test_code(#[case] file: &str, #[case] contents: &str) {
    assert!(rules_broken(file, contents).is_empty());
}

#[rstest]
fn boundaries_still_apply_to_test_code() {
    assert_eq!(
        rules_broken(
            "inbound/http/applications_tests.rs",
            "use crate::outbound::memory::MemoryStore;"
        ),
        [RuleId::LayerDependency]
    );
}

#[rstest]
fn repeated_offences_are_reported_once_per_file() {
    let err = lint_one(
        "domain/application_service.rs",
        "use diesel::prelude::*; use diesel::QueryDsl; fn f() { diesel::select(1); }",
    )
    .expect_err("diesel in the domain");
    let LintError::Violations(found) = err else {
        panic!("expected violations");
    };
    assert_eq!(found.0.len(), 1);
    assert_eq!(
        found.0.first().map(ToString::to_string).as_deref(),
        Some("domain/application_service.rs [external-crate] domain must not use the `diesel` crate")
    );
}

#[rstest]
fn files_outside_the_layers_are_refused() {
    let err = lint_one("server/mod.rs", "fn main() {}").expect_err("no layer");
    assert!(matches!(err, LintError::Unplaced { .. }));
}

#[rstest]
fn unparsable_sources_name_the_file() {
    let err = lint_one("domain/user.rs", "fn broken( {").expect_err("syntax error");
    assert!(matches!(err, LintError::Parse { ref file, .. } if file == "domain/user.rs"));
}
