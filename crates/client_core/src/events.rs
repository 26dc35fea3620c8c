//! Events published on the client bus and the notices carried with them.

use shared::domain::{ApplicantStatus, ProposalId, UserId};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Acknowledged applicant status change. Consumers refetch on receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantStatusChanged {
    pub proposal_id: ProposalId,
    pub applicant_id: UserId,
    pub status: ApplicantStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCounts {
    pub all: usize,
    pub saved: usize,
    pub applied: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    ProposalsLoaded { seq: u64, counts: ViewCounts },
    ManagedProposalsLoaded { seq: u64, count: usize },
    ApplicantStatusChanged(ApplicantStatusChanged),
    ContactRequested { applicant_id: UserId, target: Url },
    Notice(Notice),
}
