//! Pure view derivation: visibility, tab partitioning, search and ordering.

use chrono::{DateTime, Utc};
use shared::{
    domain::{ProposalStatus, ProposalTab, UserId},
    protocol::{Proposal, ProposalsResponse},
};

use crate::events::ViewCounts;

/// The three tab lists shown on the proposal board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalViews {
    pub all: Vec<Proposal>,
    pub saved: Vec<Proposal>,
    pub applied: Vec<Proposal>,
}

impl ProposalViews {
    pub fn tab(&self, tab: ProposalTab) -> &[Proposal] {
        match tab {
            ProposalTab::All => &self.all,
            ProposalTab::Saved => &self.saved,
            ProposalTab::Applied => &self.applied,
        }
    }

    pub fn counts(&self) -> ViewCounts {
        ViewCounts {
            all: self.all.len(),
            saved: self.saved.len(),
            applied: self.applied.len(),
        }
    }
}

/// How the `all` tab is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrdering {
    #[default]
    Server,
    Recent,
}

pub fn is_open_for_applications(proposal: &Proposal, now: DateTime<Utc>) -> bool {
    proposal.status == ProposalStatus::Open && proposal.application_deadline > now
}

/// Builds the base lists from a fetch. `applied` is taken from the filtered
/// `all` list, never from `saved`.
pub fn partition(response: ProposalsResponse, user_id: &UserId, now: DateTime<Utc>) -> ProposalViews {
    let all: Vec<Proposal> = response
        .found_proposals
        .into_iter()
        .filter(|proposal| is_open_for_applications(proposal, now))
        .collect();
    let saved = response
        .saved_proposals
        .into_iter()
        .filter(|proposal| is_open_for_applications(proposal, now))
        .collect();
    let applied = all
        .iter()
        .filter(|proposal| proposal.has_applicant(user_id))
        .cloned()
        .collect();

    ProposalViews {
        all,
        saved,
        applied,
    }
}

/// Returns the lowercased needle, or `None` when the query resets the view.
/// Whitespace only decides the reset; a non-blank needle is matched as typed.
pub fn normalize_query(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    }
}

/// `needle` must already be lowercased.
pub fn matches_needle(proposal: &Proposal, needle: &str) -> bool {
    proposal.title.to_lowercase().contains(needle)
        || proposal.description.to_lowercase().contains(needle)
        || proposal
            .skill_labels()
            .any(|label| label.to_lowercase().contains(needle))
}

pub fn filter_proposals(proposals: &[Proposal], query: &str) -> Vec<Proposal> {
    match normalize_query(query) {
        None => proposals.to_vec(),
        Some(needle) => proposals
            .iter()
            .filter(|proposal| matches_needle(proposal, &needle))
            .cloned()
            .collect(),
    }
}

/// Filters each base list independently. Always starts from `base`.
pub fn search(query: &str, base: &ProposalViews) -> ProposalViews {
    ProposalViews {
        all: filter_proposals(&base.all, query),
        saved: filter_proposals(&base.saved, query),
        applied: filter_proposals(&base.applied, query),
    }
}

/// Newest `created_at` first. The input is left untouched.
pub fn sort_by_recency(proposals: &[Proposal]) -> Vec<Proposal> {
    let mut sorted = proposals.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

pub fn derive_views(base: &ProposalViews, query: &str, ordering: ListOrdering) -> ProposalViews {
    let mut views = search(query, base);
    if ordering == ListOrdering::Recent {
        views.all = sort_by_recency(&views.all);
    }
    views
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
