use std::sync::Arc;

use shared::{
    domain::{ApplicantStatus, ProposalId, StatusDecision, UserId},
    protocol::{Applicant, ApplicantProfile, ApplicantStatusRequest},
};
use tokio::sync::broadcast;
use tracing::{info, warn};
use url::Url;

use crate::{
    error::MutationError,
    events::{ApplicantStatusChanged, ClientEvent, Notice},
    service::ProposalService,
};

/// Controls exposed for an applicant in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicantActions {
    pub can_decide: bool,
    pub can_show_contact: bool,
    pub can_view_profile: bool,
}

impl ApplicantActions {
    pub fn for_status(status: ApplicantStatus) -> Self {
        Self {
            can_decide: status == ApplicantStatus::Undetermined,
            can_show_contact: status == ApplicantStatus::Accepted,
            can_view_profile: status != ApplicantStatus::Rejected,
        }
    }
}

pub fn profile_path(user_id: &UserId) -> String {
    format!("/user/{user_id}")
}

pub fn mailto_target(profile: &ApplicantProfile) -> Option<Url> {
    let email = profile.email.as_deref()?.trim();
    if email.is_empty() {
        return None;
    }
    Url::parse(&format!("mailto:{email}")).ok()
}

pub struct ApplicantStatusController {
    service: Arc<dyn ProposalService>,
    events: broadcast::Sender<ClientEvent>,
}

impl ApplicantStatusController {
    pub fn new(service: Arc<dyn ProposalService>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self { service, events }
    }

    /// Sends one status mutation. Does not look at the applicant's current
    /// status and does not coalesce repeated calls.
    pub async fn set_status(
        &self,
        proposal_id: &ProposalId,
        applicant_id: &UserId,
        decision: StatusDecision,
    ) -> Result<ApplicantStatusChanged, MutationError> {
        let request = ApplicantStatusRequest {
            proposal_id: proposal_id.clone(),
            applicant_id: applicant_id.clone(),
            status: decision,
        };

        if let Err(err) = self.service.update_applicant_status(request).await {
            warn!(
                proposal = %proposal_id,
                applicant = %applicant_id,
                status = %decision,
                error = %err,
                "applicants: status update failed"
            );
            let _ = self.events.send(ClientEvent::Notice(Notice::error(
                "Error updating status",
                "There was an error updating the status of the applicant.",
            )));
            return Err(err.into());
        }

        info!(
            proposal = %proposal_id,
            applicant = %applicant_id,
            status = %decision,
            "applicants: status updated"
        );
        let change = ApplicantStatusChanged {
            proposal_id: proposal_id.clone(),
            applicant_id: applicant_id.clone(),
            status: decision.into(),
        };
        let _ = self.events.send(ClientEvent::Notice(Notice::success(
            "Status updated successfully",
            "The status of the applicant has been updated successfully.",
        )));
        let _ = self
            .events
            .send(ClientEvent::ApplicantStatusChanged(change.clone()));
        Ok(change)
    }

    /// Like [`Self::set_status`] but refuses to leave a terminal status.
    /// Nothing is sent when the transition is invalid.
    pub async fn set_status_checked(
        &self,
        proposal_id: &ProposalId,
        applicant: &Applicant,
        decision: StatusDecision,
    ) -> Result<ApplicantStatusChanged, MutationError> {
        if let Err(err) = applicant.status.transition(decision) {
            warn!(
                proposal = %proposal_id,
                applicant = %applicant.user_id(),
                error = %err,
                "applicants: rejected invalid transition"
            );
            return Err(err.into());
        }
        self.set_status(proposal_id, applicant.user_id(), decision)
            .await
    }

    pub fn contact(&self, profile: &ApplicantProfile) -> Option<Url> {
        let target = mailto_target(profile)?;
        let _ = self.events.send(ClientEvent::ContactRequested {
            applicant_id: profile.id.clone(),
            target: target.clone(),
        });
        Some(target)
    }
}

#[cfg(test)]
#[path = "tests/applicants_tests.rs"]
mod tests;
