use super::*;
use crate::{
    error::ServiceError,
    events::NoticeLevel,
    test_support::{
        applicant, drain, event_bus, ids, proposal, response, ts, with_applicants, with_skills,
        FakeProposalService,
    },
};
use shared::domain::ApplicantStatus;

fn controller(
    service: &Arc<FakeProposalService>,
    user: &str,
) -> (
    Arc<ProposalListController>,
    broadcast::Receiver<ClientEvent>,
) {
    let (events, rx) = event_bus();
    let controller = ProposalListController::new(
        Arc::clone(service) as Arc<dyn ProposalService>,
        UserId::new(user),
        events,
    );
    (Arc::new(controller), rx)
}

fn board_response() -> shared::protocol::ProposalsResponse {
    let web = with_applicants(
        proposal("web", "Web App"),
        vec![applicant("me", ApplicantStatus::Undetermined)],
    );
    let ml = with_skills(proposal("ml", "ML Tool"), &["python"]);
    response(vec![web, ml.clone()], vec![ml])
}

#[tokio::test]
async fn load_partitions_views_and_announces_counts() {
    let service = Arc::new(FakeProposalService::default());
    service.queue_proposals(Ok(board_response())).await;
    let (controller, mut rx) = controller(&service, "me");

    let views = controller
        .load()
        .await
        .expect("load")
        .applied()
        .expect("latest load applies");

    assert_eq!(ids(&views.all), vec!["web", "ml"]);
    assert_eq!(ids(&views.saved), vec!["ml"]);
    assert_eq!(ids(&views.applied), vec!["web"]);
    assert_eq!(service.proposal_fetches(), 1);

    match rx.recv().await.expect("event") {
        ClientEvent::ProposalsLoaded { seq, counts } => {
            assert_eq!(seq, 1);
            assert_eq!((counts.all, counts.saved, counts.applied), (2, 1, 1));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn failed_load_keeps_previous_lists_and_notifies_once() {
    let service = Arc::new(FakeProposalService::default());
    service.queue_proposals(Ok(board_response())).await;
    let (controller, mut rx) = controller(&service, "me");
    controller.load().await.expect("first load");
    let before = controller.views().await;
    drain(&mut rx);

    service
        .queue_proposals(Err(ServiceError::Transport("connection refused".to_string())))
        .await;
    let err = controller.load().await.expect_err("second load fails");

    assert!(matches!(err, FetchError::Service(ServiceError::Transport(_))));
    assert_eq!(controller.views().await, before);

    let notices: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            ClientEvent::Notice(notice) => Some(notice),
            _ => None,
        })
        .collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].description, "connection refused");
}

#[tokio::test]
async fn query_applies_to_all_three_tabs_and_blank_resets() {
    let service = Arc::new(FakeProposalService::default());
    service.queue_proposals(Ok(board_response())).await;
    let (controller, _rx) = controller(&service, "me");
    controller.load().await.expect("load");

    let filtered = controller.set_query("PY").await;
    assert_eq!(ids(&filtered.all), vec!["ml"]);
    assert_eq!(ids(&filtered.saved), vec!["ml"]);
    assert!(filtered.applied.is_empty());

    let reset = controller.set_query("  ").await;
    assert_eq!(reset, controller.base_views().await);

    let refiltered = controller.set_query("web").await;
    assert_eq!(ids(&refiltered.all), vec!["web"]);
    assert_eq!(ids(&refiltered.applied), vec!["web"]);
}

#[tokio::test]
async fn active_query_is_reapplied_after_reload() {
    let service = Arc::new(FakeProposalService::default());
    service.queue_proposals(Ok(board_response())).await;
    let (controller, _rx) = controller(&service, "me");
    controller.load().await.expect("load");
    controller.set_query("tool").await;

    let extra = proposal("tool-2", "Second Tool");
    let mut next = board_response();
    next.found_proposals.push(extra);
    service.queue_proposals(Ok(next)).await;

    let views = controller
        .load()
        .await
        .expect("reload")
        .applied()
        .expect("applied");
    assert_eq!(ids(&views.all), vec!["ml", "tool-2"]);
    assert_eq!(controller.query().await, "tool");
}

#[tokio::test]
async fn show_recent_clears_query_and_orders_all_tab() {
    let mut older = proposal("older", "Older");
    older.created_at = ts("2024-01-01T00:00:00Z");
    let mut newer = proposal("newer", "Newer");
    newer.created_at = ts("2024-06-01T00:00:00Z");

    let service = Arc::new(FakeProposalService::default());
    service
        .queue_proposals(Ok(response(vec![older, newer], Vec::new())))
        .await;
    let (controller, _rx) = controller(&service, "me");
    controller.load().await.expect("load");
    controller.set_query("old").await;

    let recent = controller.show_recent().await;
    assert_eq!(ids(&recent.all), vec!["newer", "older"]);
    assert_eq!(controller.query().await, "");
    assert_eq!(controller.ordering().await, ListOrdering::Recent);

    let all = controller.show_all().await;
    assert_eq!(ids(&all.all), vec!["older", "newer"]);
}

#[tokio::test]
async fn superseded_response_never_overwrites_newer_state() {
    let service = Arc::new(FakeProposalService::default());
    let first_reply = service.gate_proposals().await;
    service
        .queue_proposals(Ok(response(vec![proposal("second", "Second")], Vec::new())))
        .await;
    let (controller, _rx) = controller(&service, "me");

    let first = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.load().await })
    };
    while service.proposal_fetches() < 1 {
        tokio::task::yield_now().await;
    }

    let second = controller.load().await.expect("second load");
    assert!(!second.is_superseded());

    let _ = first_reply.send(Ok(response(vec![proposal("first", "First")], Vec::new())));
    let first = first.await.expect("join").expect("first load");

    assert_eq!(first, LoadOutcome::Superseded { seq: 1, latest: 2 });
    assert_eq!(ids(&controller.views().await.all), vec!["second"]);
}

#[tokio::test]
async fn superseded_failure_is_dropped_without_notice() {
    let service = Arc::new(FakeProposalService::default());
    let first_reply = service.gate_proposals().await;
    service.queue_proposals(Ok(board_response())).await;
    let (controller, mut rx) = controller(&service, "me");

    let first = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.load().await })
    };
    while service.proposal_fetches() < 1 {
        tokio::task::yield_now().await;
    }
    controller.load().await.expect("second load");
    drain(&mut rx);

    let _ = first_reply.send(Err(ServiceError::Transport("timed out".to_string())));
    let outcome = first.await.expect("join").expect("stale failure is not surfaced");

    assert!(outcome.is_superseded());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn switching_user_rederives_applied_and_reloads() {
    let service = Arc::new(FakeProposalService::default());
    let shared_proposal = with_applicants(
        proposal("shared", "Shared"),
        vec![applicant("other", ApplicantStatus::Undetermined)],
    );
    service
        .queue_proposals(Ok(response(vec![shared_proposal], Vec::new())))
        .await;
    let (controller, _rx) = controller(&service, "me");
    let views = controller.load().await.expect("load").applied().expect("applied");
    assert!(views.applied.is_empty());

    service
        .queue_proposals(Err(ServiceError::Transport("offline".to_string())))
        .await;
    controller
        .switch_user(UserId::new("other"))
        .await
        .expect_err("reload fails");

    assert_eq!(controller.current_user().await, UserId::new("other"));
    assert_eq!(ids(&controller.tab(ProposalTab::Applied).await), vec!["shared"]);
    assert_eq!(service.proposal_fetches(), 2);
}
