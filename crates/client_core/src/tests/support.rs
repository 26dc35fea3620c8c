use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::{
    domain::{ApplicantStatus, ProposalId, ProposalStatus, UserId},
    protocol::{
        Applicant, ApplicantProfile, ApplicantStatusRequest, ProfileAbout, Proposal,
        ProposalsResponse, RequiredSkill, UserProposalsResponse,
    },
};
use tokio::sync::{broadcast, oneshot, Mutex};

use crate::{error::ServiceError, events::ClientEvent, service::ProposalService};

type Reply<T> = oneshot::Receiver<Result<T, ServiceError>>;
pub(crate) type ReplySender<T> = oneshot::Sender<Result<T, ServiceError>>;

/// In-memory backend. Fetch replies are consumed in call order; a gated
/// reply stays pending until the test sends through its sender.
#[derive(Default)]
pub(crate) struct FakeProposalService {
    proposals: Mutex<VecDeque<Reply<ProposalsResponse>>>,
    user_proposals: Mutex<VecDeque<Reply<UserProposalsResponse>>>,
    status_results: Mutex<VecDeque<Result<(), ServiceError>>>,
    status_requests: Mutex<Vec<ApplicantStatusRequest>>,
    proposal_fetches: AtomicUsize,
    user_proposal_fetches: AtomicUsize,
}

impl FakeProposalService {
    pub(crate) async fn queue_proposals(&self, result: Result<ProposalsResponse, ServiceError>) {
        let tx = self.gate_proposals().await;
        let _ = tx.send(result);
    }

    pub(crate) async fn gate_proposals(&self) -> ReplySender<ProposalsResponse> {
        let (tx, rx) = oneshot::channel();
        self.proposals.lock().await.push_back(rx);
        tx
    }

    pub(crate) async fn queue_user_proposals(
        &self,
        result: Result<UserProposalsResponse, ServiceError>,
    ) {
        let tx = self.gate_user_proposals().await;
        let _ = tx.send(result);
    }

    pub(crate) async fn gate_user_proposals(&self) -> ReplySender<UserProposalsResponse> {
        let (tx, rx) = oneshot::channel();
        self.user_proposals.lock().await.push_back(rx);
        tx
    }

    pub(crate) async fn queue_status(&self, result: Result<(), ServiceError>) {
        self.status_results.lock().await.push_back(result);
    }

    pub(crate) async fn status_requests(&self) -> Vec<ApplicantStatusRequest> {
        self.status_requests.lock().await.clone()
    }

    pub(crate) fn proposal_fetches(&self) -> usize {
        self.proposal_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn user_proposal_fetches(&self) -> usize {
        self.user_proposal_fetches.load(Ordering::SeqCst)
    }
}

async fn await_reply<T>(reply: Option<Reply<T>>) -> Result<T, ServiceError> {
    match reply {
        Some(rx) => rx
            .await
            .unwrap_or_else(|_| Err(ServiceError::Transport("reply dropped".to_string()))),
        None => Err(ServiceError::Transport("no response queued".to_string())),
    }
}

#[async_trait]
impl ProposalService for FakeProposalService {
    async fn fetch_proposals(&self) -> Result<ProposalsResponse, ServiceError> {
        let reply = self.proposals.lock().await.pop_front();
        self.proposal_fetches.fetch_add(1, Ordering::SeqCst);
        await_reply(reply).await
    }

    async fn fetch_user_proposals(&self) -> Result<UserProposalsResponse, ServiceError> {
        let reply = self.user_proposals.lock().await.pop_front();
        self.user_proposal_fetches.fetch_add(1, Ordering::SeqCst);
        await_reply(reply).await
    }

    async fn update_applicant_status(
        &self,
        request: ApplicantStatusRequest,
    ) -> Result<(), ServiceError> {
        self.status_requests.lock().await.push(request);
        self.status_results
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

pub(crate) fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("timestamp")
}

pub(crate) fn proposal(id: &str, title: &str) -> Proposal {
    Proposal {
        id: ProposalId::new(id),
        title: title.to_string(),
        description: String::new(),
        skills_required: Vec::new(),
        status: ProposalStatus::Open,
        application_deadline: Utc::now() + Duration::days(30),
        created_at: ts("2024-01-01T00:00:00Z"),
        applicants: Vec::new(),
    }
}

pub(crate) fn with_skills(mut proposal: Proposal, skills: &[&str]) -> Proposal {
    proposal.skills_required = skills.iter().map(|label| RequiredSkill::new(*label)).collect();
    proposal
}

pub(crate) fn with_applicants(mut proposal: Proposal, applicants: Vec<Applicant>) -> Proposal {
    proposal.applicants = applicants;
    proposal
}

pub(crate) fn applicant(user_id: &str, status: ApplicantStatus) -> Applicant {
    Applicant {
        id: None,
        applicant: ApplicantProfile {
            id: UserId::new(user_id),
            email: Some(format!("{user_id}@example.com")),
            about: Some(ProfileAbout {
                name: Some(format!("User {user_id}")),
                title: None,
                profile_img: None,
            }),
        },
        applied_on: ts("2024-02-01T12:00:00Z"),
        status,
    }
}

pub(crate) fn response(found: Vec<Proposal>, saved: Vec<Proposal>) -> ProposalsResponse {
    ProposalsResponse {
        found_proposals: found,
        saved_proposals: saved,
    }
}

pub(crate) fn ids(proposals: &[Proposal]) -> Vec<&str> {
    proposals.iter().map(|proposal| proposal.id.as_str()).collect()
}

pub(crate) fn event_bus() -> (broadcast::Sender<ClientEvent>, broadcast::Receiver<ClientEvent>) {
    broadcast::channel(64)
}

/// Drains whatever is currently buffered on the receiver.
pub(crate) fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
