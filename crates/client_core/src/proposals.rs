//! Board listing: the all/saved/applied tabs and their shared search query.

use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{ProposalTab, UserId},
    protocol::Proposal,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::FetchError,
    events::{ClientEvent, Notice},
    filter::{derive_views, partition, ListOrdering, ProposalViews},
    service::ProposalService,
    LoadOutcome,
};

pub struct ProposalListController {
    service: Arc<dyn ProposalService>,
    events: broadcast::Sender<ClientEvent>,
    inner: Mutex<ListState>,
}

struct ListState {
    current_user: UserId,
    latest_issued: u64,
    base: ProposalViews,
    query: String,
    ordering: ListOrdering,
    visible: ProposalViews,
}

impl ListState {
    fn refresh(&mut self) {
        self.visible = derive_views(&self.base, &self.query, self.ordering);
    }
}

impl ProposalListController {
    pub fn new(
        service: Arc<dyn ProposalService>,
        current_user: UserId,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        Self {
            service,
            events,
            inner: Mutex::new(ListState {
                current_user,
                latest_issued: 0,
                base: ProposalViews::default(),
                query: String::new(),
                ordering: ListOrdering::Server,
                visible: ProposalViews::default(),
            }),
        }
    }

    /// Fetches all and saved proposals in one round trip and replaces the
    /// base lists. Only the most recently issued load may write state.
    pub async fn load(&self) -> Result<LoadOutcome<ProposalViews>, FetchError> {
        let (seq, user_id) = {
            let mut guard = self.inner.lock().await;
            guard.latest_issued += 1;
            (guard.latest_issued, guard.current_user.clone())
        };
        info!(seq, user = %user_id, "proposals: loading");

        let result = self.service.fetch_proposals().await;

        let mut guard = self.inner.lock().await;
        if seq != guard.latest_issued {
            debug!(
                seq,
                latest = guard.latest_issued,
                ok = result.is_ok(),
                "proposals: discarding superseded response"
            );
            return Ok(LoadOutcome::Superseded {
                seq,
                latest: guard.latest_issued,
            });
        }

        match result {
            Ok(response) => {
                guard.base = partition(response, &user_id, Utc::now());
                guard.refresh();
                let visible = guard.visible.clone();
                let counts = guard.base.counts();
                drop(guard);

                info!(
                    seq,
                    all = counts.all,
                    saved = counts.saved,
                    applied = counts.applied,
                    "proposals: loaded"
                );
                let _ = self
                    .events
                    .send(ClientEvent::ProposalsLoaded { seq, counts });
                Ok(LoadOutcome::Applied(visible))
            }
            Err(err) => {
                drop(guard);
                warn!(seq, error = %err, "proposals: fetch failed");
                let _ = self.events.send(ClientEvent::Notice(Notice::error(
                    "Error fetching proposals",
                    err.user_message(),
                )));
                Err(err.into())
            }
        }
    }

    /// Switches the current user and reloads. The applied tab is re-derived
    /// for the new user right away so a failed reload never shows another
    /// user's applications.
    pub async fn switch_user(
        &self,
        user_id: UserId,
    ) -> Result<LoadOutcome<ProposalViews>, FetchError> {
        {
            let mut guard = self.inner.lock().await;
            if guard.current_user != user_id {
                info!(from = %guard.current_user, to = %user_id, "proposals: switching user");
                let applied = guard
                    .base
                    .all
                    .iter()
                    .filter(|proposal| proposal.has_applicant(&user_id))
                    .cloned()
                    .collect();
                guard.base.applied = applied;
                guard.current_user = user_id;
                guard.refresh();
            }
        }
        self.load().await
    }

    pub async fn set_query(&self, query: &str) -> ProposalViews {
        let mut guard = self.inner.lock().await;
        guard.query = query.to_string();
        guard.refresh();
        guard.visible.clone()
    }

    /// Clears the query and restores server order.
    pub async fn show_all(&self) -> ProposalViews {
        self.reset_with(ListOrdering::Server).await
    }

    /// Clears the query and orders the all tab newest first.
    pub async fn show_recent(&self) -> ProposalViews {
        self.reset_with(ListOrdering::Recent).await
    }

    async fn reset_with(&self, ordering: ListOrdering) -> ProposalViews {
        let mut guard = self.inner.lock().await;
        guard.query.clear();
        guard.ordering = ordering;
        guard.refresh();
        guard.visible.clone()
    }

    pub async fn views(&self) -> ProposalViews {
        self.inner.lock().await.visible.clone()
    }

    pub async fn tab(&self, tab: ProposalTab) -> Vec<Proposal> {
        self.inner.lock().await.visible.tab(tab).to_vec()
    }

    pub async fn base_views(&self) -> ProposalViews {
        self.inner.lock().await.base.clone()
    }

    pub async fn query(&self) -> String {
        self.inner.lock().await.query.clone()
    }

    pub async fn ordering(&self) -> ListOrdering {
        self.inner.lock().await.ordering
    }

    pub async fn current_user(&self) -> UserId {
        self.inner.lock().await.current_user.clone()
    }
}

#[cfg(test)]
#[path = "tests/proposals_tests.rs"]
mod tests;
