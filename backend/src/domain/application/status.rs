//! Application status and its storage/wire encodings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Position of an application in the review workflow.
///
/// The only forward path is `New -> InProgress -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Submitted, not yet picked up by staff.
    New,
    /// Taken into work; carries a staff comment.
    InProgress,
    /// Finished; carries a design image.
    Done,
}

/// Error returned when parsing an unknown status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

impl ApplicationStatus {
    /// Single-letter code used by the persistence layer.
    pub fn code(self) -> &'static str {
        match self {
            Self::New => "N",
            Self::InProgress => "P",
            Self::Done => "D",
        }
    }

    /// Parse the single-letter storage code.
    pub fn from_code(code: &str) -> Result<Self, UnknownStatus> {
        match code {
            "N" => Ok(Self::New),
            "P" => Ok(Self::InProgress),
            "D" => Ok(Self::Done),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }

    /// Snake-case name used in JSON payloads and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Whether the status may no longer move except forward.
    pub fn is_locked(self) -> bool {
        matches!(self, Self::InProgress | Self::Done)
    }

    /// The next status along the workflow, if any.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::New => Some(Self::InProgress),
            Self::InProgress => Some(Self::Done),
            Self::Done => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApplicationStatus::New, "N", "new")]
    #[case(ApplicationStatus::InProgress, "P", "in_progress")]
    #[case(ApplicationStatus::Done, "D", "done")]
    fn encodings_agree(
        #[case] status: ApplicationStatus,
        #[case] code: &str,
        #[case] name: &str,
    ) {
        assert_eq!(status.code(), code);
        assert_eq!(ApplicationStatus::from_code(code), Ok(status));
        assert_eq!(name.parse::<ApplicationStatus>(), Ok(status));
        assert_eq!(
            serde_json::to_value(status).expect("serialises"),
            serde_json::Value::String(name.to_owned())
        );
    }

    #[rstest]
    fn only_new_is_unlocked() {
        assert!(!ApplicationStatus::New.is_locked());
        assert!(ApplicationStatus::InProgress.is_locked());
        assert!(ApplicationStatus::Done.is_locked());
    }

    #[rstest]
    fn done_has_no_successor() {
        assert_eq!(
            ApplicationStatus::New.successor(),
            Some(ApplicationStatus::InProgress)
        );
        assert_eq!(
            ApplicationStatus::InProgress.successor(),
            Some(ApplicationStatus::Done)
        );
        assert_eq!(ApplicationStatus::Done.successor(), None);
    }

    #[rstest]
    #[case("X")]
    #[case("n")]
    fn unknown_codes_are_rejected(#[case] code: &str) {
        assert!(ApplicationStatus::from_code(code).is_err());
    }
}
