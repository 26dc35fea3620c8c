pub mod applicants;
pub mod board;
pub mod error;
pub mod events;
pub mod filter;
pub mod manage;
pub mod proposals;
pub mod service;

pub use applicants::{mailto_target, profile_path, ApplicantActions, ApplicantStatusController};
pub use board::ProposalBoard;
pub use error::{FetchError, MutationError, ServiceError};
pub use events::{ApplicantStatusChanged, ClientEvent, Notice, NoticeLevel, ViewCounts};
pub use filter::{search, sort_by_recency, ListOrdering, ProposalViews};
pub use manage::ManageProposalsController;
pub use proposals::ProposalListController;
pub use service::{HttpProposalService, ProposalService};

/// Result of a load that may have been overtaken by a newer one.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    Applied(T),
    /// A later load was issued before this response arrived; nothing changed.
    Superseded { seq: u64, latest: u64 },
}

impl<T> LoadOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            LoadOutcome::Applied(value) => Some(value),
            LoadOutcome::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, LoadOutcome::Superseded { .. })
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
