//! Proposals owned by the current user, with their applicants.

use std::sync::Arc;

use shared::{
    domain::{ProposalId, UserId},
    protocol::{Applicant, Proposal},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::FetchError,
    events::{ClientEvent, Notice},
    filter::filter_proposals,
    service::ProposalService,
    LoadOutcome,
};

pub struct ManageProposalsController {
    service: Arc<dyn ProposalService>,
    events: broadcast::Sender<ClientEvent>,
    inner: Mutex<ManageState>,
}

#[derive(Default)]
struct ManageState {
    latest_issued: u64,
    base: Vec<Proposal>,
    query: String,
    visible: Vec<Proposal>,
}

impl ManageState {
    fn refresh(&mut self) {
        self.visible = filter_proposals(&self.base, &self.query);
    }
}

impl ManageProposalsController {
    pub fn new(service: Arc<dyn ProposalService>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            service,
            events,
            inner: Mutex::new(ManageState::default()),
        }
    }

    /// Owners see every posting they manage, closed or expired included.
    pub async fn load(&self) -> Result<LoadOutcome<Vec<Proposal>>, FetchError> {
        let seq = {
            let mut guard = self.inner.lock().await;
            guard.latest_issued += 1;
            guard.latest_issued
        };
        info!(seq, "manage: loading owned proposals");

        let result = self.service.fetch_user_proposals().await;

        let mut guard = self.inner.lock().await;
        if seq != guard.latest_issued {
            debug!(seq, latest = guard.latest_issued, "manage: discarding superseded response");
            return Ok(LoadOutcome::Superseded {
                seq,
                latest: guard.latest_issued,
            });
        }

        match result {
            Ok(response) => {
                guard.base = response.found_user_proposals;
                guard.refresh();
                let visible = guard.visible.clone();
                let count = guard.base.len();
                drop(guard);

                info!(seq, count, "manage: loaded owned proposals");
                let _ = self
                    .events
                    .send(ClientEvent::ManagedProposalsLoaded { seq, count });
                Ok(LoadOutcome::Applied(visible))
            }
            Err(err) => {
                drop(guard);
                warn!(seq, error = %err, "manage: fetch failed");
                let _ = self.events.send(ClientEvent::Notice(Notice::error(
                    "Error fetching proposals. Please try again later.",
                    err.user_message(),
                )));
                Err(err.into())
            }
        }
    }

    pub async fn search(&self, query: &str) -> Vec<Proposal> {
        let mut guard = self.inner.lock().await;
        guard.query = query.to_string();
        guard.refresh();
        guard.visible.clone()
    }

    pub async fn clear_search(&self) -> Vec<Proposal> {
        self.search("").await
    }

    pub async fn proposals(&self) -> Vec<Proposal> {
        self.inner.lock().await.visible.clone()
    }

    pub async fn query(&self) -> String {
        self.inner.lock().await.query.clone()
    }

    /// Looks the applicant up in the unfiltered list.
    pub async fn find_applicant(
        &self,
        proposal_id: &ProposalId,
        applicant_id: &UserId,
    ) -> Option<Applicant> {
        let guard = self.inner.lock().await;
        guard
            .base
            .iter()
            .find(|proposal| &proposal.id == proposal_id)
            .and_then(|proposal| proposal.applicant(applicant_id))
            .cloned()
    }
}

#[cfg(test)]
#[path = "tests/manage_tests.rs"]
mod tests;
