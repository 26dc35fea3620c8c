use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ProposalId);
id_newtype!(ApplicationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    #[default]
    Undetermined,
    Accepted,
    Rejected,
}

impl ApplicantStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicantStatus::Undetermined => "undetermined",
            ApplicantStatus::Accepted => "accepted",
            ApplicantStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ApplicantStatus::Undetermined)
    }

    /// Only `undetermined` may move, and only to one of the two decisions.
    pub fn transition(self, decision: StatusDecision) -> Result<ApplicantStatus, InvalidTransition> {
        if self.is_terminal() {
            return Err(InvalidTransition {
                from: self,
                to: decision.into(),
            });
        }
        Ok(decision.into())
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of an applicant status change. `undetermined` is never a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDecision {
    Accepted,
    Rejected,
}

impl From<StatusDecision> for ApplicantStatus {
    fn from(value: StatusDecision) -> Self {
        match value {
            StatusDecision::Accepted => ApplicantStatus::Accepted,
            StatusDecision::Rejected => ApplicantStatus::Rejected,
        }
    }
}

impl fmt::Display for StatusDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ApplicantStatus::from(*self).fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("applicant status cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: ApplicantStatus,
    pub to: ApplicantStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProposalTab {
    #[default]
    All,
    Saved,
    Applied,
}

impl ProposalTab {
    pub fn label(self) -> &'static str {
        match self {
            ProposalTab::All => "All Proposals",
            ProposalTab::Saved => "Saved Proposals",
            ProposalTab::Applied => "Applied Proposals",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ProposalTab::All => "No projects found",
            ProposalTab::Saved => "No saved projects",
            ProposalTab::Applied => "No applied projects",
        }
    }
}
