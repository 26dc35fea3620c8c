//! One remote service, one event bus, and the controllers that share them.

use std::sync::Arc;

use shared::domain::{ProposalId, StatusDecision, UserId};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    applicants::ApplicantStatusController,
    error::MutationError,
    events::{ApplicantStatusChanged, ClientEvent},
    manage::ManageProposalsController,
    proposals::ProposalListController,
    service::ProposalService,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct ProposalBoard {
    proposals: ProposalListController,
    manage: ManageProposalsController,
    applicants: ApplicantStatusController,
    events: broadcast::Sender<ClientEvent>,
}

impl ProposalBoard {
    pub fn new(service: Arc<dyn ProposalService>, current_user: UserId) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            proposals: ProposalListController::new(
                Arc::clone(&service),
                current_user,
                events.clone(),
            ),
            manage: ManageProposalsController::new(Arc::clone(&service), events.clone()),
            applicants: ApplicantStatusController::new(service, events.clone()),
            events,
        })
    }

    pub fn proposals(&self) -> &ProposalListController {
        &self.proposals
    }

    pub fn manage(&self) -> &ManageProposalsController {
        &self.manage
    }

    pub fn applicants(&self) -> &ApplicantStatusController {
        &self.applicants
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Reloads both listings. Failures are already reported as notices.
    pub async fn reload(&self) {
        let (listing, owned) = tokio::join!(self.proposals.load(), self.manage.load());
        if let Err(err) = listing {
            debug!(error = %err, "board: listing reload failed");
        }
        if let Err(err) = owned {
            debug!(error = %err, "board: owned proposals reload failed");
        }
    }

    /// Applies a decision. With `checked`, the applicant must be present in
    /// the loaded owned proposals and still undetermined.
    pub async fn decide(
        &self,
        proposal_id: &ProposalId,
        applicant_id: &UserId,
        decision: StatusDecision,
        checked: bool,
    ) -> Result<ApplicantStatusChanged, MutationError> {
        if !checked {
            return self
                .applicants
                .set_status(proposal_id, applicant_id, decision)
                .await;
        }

        let applicant = self
            .manage
            .find_applicant(proposal_id, applicant_id)
            .await
            .ok_or_else(|| MutationError::UnknownApplicant {
                proposal_id: proposal_id.to_string(),
                applicant_id: applicant_id.to_string(),
            })?;
        self.applicants
            .set_status_checked(proposal_id, &applicant, decision)
            .await
    }

    /// Refetches both listings after every acknowledged status change.
    /// Stops once the board is dropped.
    pub fn spawn_reload_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.events.subscribe();
        let board = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ClientEvent::ApplicantStatusChanged(change)) => {
                        info!(
                            proposal = %change.proposal_id,
                            applicant = %change.applicant_id,
                            "board: status changed, reloading"
                        );
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "board: event listener lagged, reloading");
                    }
                    Err(RecvError::Closed) => break,
                }

                let Some(board) = board.upgrade() else {
                    break;
                };
                board.reload().await;
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
