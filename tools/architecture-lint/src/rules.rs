//! The rules and how each one reads a file's references.

use std::collections::BTreeSet;

use crate::layer::{Layer, Placement};
use crate::scan::{Reference, Usage};

/// Library name of the backend crate, as it appears in absolute paths.
const CRATE_NAME: &str = "design_desk";

/// Workflow checks that must run against a locked application row.
const LOCKED_WORKFLOW: [&str; 2] = ["apply_transition", "check_deletion"];

/// Ports the domain drives: repositories and the image store.
const DRIVEN_PORTS: [&str; 4] = [
    "ApplicationRepository",
    "CategoryRepository",
    "UserRepository",
    "ImageStore",
];

/// Ports that drive the domain: the use cases handlers call.
const DRIVING_PORTS: [&str; 7] = [
    "ApplicationCommand",
    "ApplicationQuery",
    "CategoryCommand",
    "CategoryQuery",
    "LoginService",
    "RegistrationCommand",
    "UserProfileQuery",
];

/// Identifies which rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleId {
    /// A layer named a sibling layer it must not depend on.
    LayerDependency,
    /// A layer named a third-party crate reserved for another layer.
    ExternalCrate,
    /// Transition or deletion rules evaluated away from the locked row.
    LockedWorkflow,
    /// A stored application rebuilt outside a storage adapter.
    Rehydration,
    /// Inbound code named a repository or the image store.
    DrivenPortInInbound,
    /// Outbound code named a use-case port.
    DrivingPortInOutbound,
}

impl RuleId {
    /// Short kebab-case code printed in reports.
    pub const fn code(self) -> &'static str {
        match self {
            Self::LayerDependency => "layer-dependency",
            Self::ExternalCrate => "external-crate",
            Self::LockedWorkflow => "locked-workflow",
            Self::Rehydration => "rehydration",
            Self::DrivenPortInInbound => "driven-port-in-inbound",
            Self::DrivingPortInOutbound => "driving-port-in-outbound",
        }
    }
}

const fn forbidden_layers(layer: Layer) -> &'static [Layer] {
    match layer {
        Layer::Domain => &[Layer::Inbound, Layer::Outbound],
        Layer::Inbound => &[Layer::Outbound],
        Layer::Outbound => &[Layer::Inbound],
    }
}

const fn forbidden_crates(layer: Layer) -> &'static [&'static str] {
    match layer {
        Layer::Domain => &[
            "actix",
            "actix_service",
            "actix_session",
            "actix_web",
            "cap_std",
            "diesel",
            "diesel_async",
            "diesel_migrations",
            "utoipa",
        ],
        Layer::Inbound => &["cap_std", "diesel", "diesel_async", "diesel_migrations"],
        Layer::Outbound => &[
            "actix",
            "actix_service",
            "actix_session",
            "actix_web",
            "utoipa",
        ],
    }
}

/// Layer named by a crate-internal path, if any.
fn internal_layer(segments: &[String]) -> Option<Layer> {
    let mut rest = segments.iter().map(String::as_str);
    let first = rest.next()?;
    let named = match first {
        CRATE_NAME | "crate" => rest.next()?,
        "self" | "super" => rest.find(|segment| !matches!(*segment, "self" | "super"))?,
        other => other,
    };
    Layer::from_module(named)
}

/// Third-party crate a path starts from, if any.
fn external_crate(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    (!matches!(first, "crate" | "self" | "super" | CRATE_NAME)).then_some(first)
}

fn check_boundaries(placement: Placement, reference: &Reference, found: &mut Findings) {
    let layer = placement.layer;
    if let Some(target) = internal_layer(&reference.segments)
        .filter(|target| forbidden_layers(layer).contains(target))
    {
        found.insert((
            RuleId::LayerDependency,
            format!(
                "{} must not depend on crate::{}",
                layer.module(),
                target.module()
            ),
        ));
    }
    if let Some(name) = external_crate(&reference.segments)
        .filter(|name| forbidden_crates(layer).contains(name))
    {
        found.insert((
            RuleId::ExternalCrate,
            format!("{} must not use the `{name}` crate", layer.module()),
        ));
    }
}

fn check_placement(placement: Placement, reference: &Reference, found: &mut Findings) {
    let storage_side = placement.layer == Layer::Outbound || placement.workflow_home;
    if reference.usage == Usage::Call && !storage_side {
        if let Some(name) = reference
            .last()
            .filter(|name| LOCKED_WORKFLOW.contains(name))
        {
            found.insert((
                RuleId::LockedWorkflow,
                format!("`{name}` may only run inside an application repository"),
            ));
        }
        if reference.ends_with(&["Application", "restore"]) {
            found.insert((
                RuleId::Rehydration,
                "`Application::restore` may only be called by storage adapters".to_owned(),
            ));
        }
    }
    let Some(name) = reference.last() else {
        return;
    };
    match placement.layer {
        Layer::Inbound if DRIVEN_PORTS.contains(&name) => {
            found.insert((
                RuleId::DrivenPortInInbound,
                format!("handlers must reach `{name}` through a use-case port"),
            ));
        }
        Layer::Outbound if DRIVING_PORTS.contains(&name) => {
            found.insert((
                RuleId::DrivingPortInOutbound,
                format!("adapters must not name the use-case port `{name}`"),
            ));
        }
        _ => {}
    }
}

type Findings = BTreeSet<(RuleId, String)>;

/// Evaluate every rule for one file. Boundaries apply to test code too;
/// placement rules only to production code.
pub(crate) fn check(placement: Placement, references: &[Reference]) -> Findings {
    let mut found = Findings::new();
    for reference in references {
        check_boundaries(placement, reference, &mut found);
        if !placement.test_file && !reference.in_test {
            check_placement(placement, reference, &mut found);
        }
    }
    found
}
