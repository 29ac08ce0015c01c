//! Kitchen display sync against an in-memory backend

mod support;

use std::sync::Arc;
use std::time::Duration;

use brew_client::sync::{KitchenQueue, Merge, OrderView, Poller};
use brew_client::{ClientError, ErrorCode, ErrorKind, KitchenSync};
use shared::order::{OrderStatus, Transition};
use shared::request::Operator;
use support::{FakeBackend, Fault};

type Kitchen = (
    Arc<KitchenSync<FakeBackend>>,
    Poller<KitchenQueue<FakeBackend>>,
);

fn kitchen(backend: &Arc<FakeBackend>) -> Kitchen {
    let view = Arc::new(OrderView::new());
    let sync = KitchenSync::new(
        Arc::clone(backend),
        Arc::clone(&view),
        Operator::new("cook-1", "Meena"),
    );
    let poller = Poller::new(
        KitchenQueue::new(Arc::clone(backend), None),
        view,
        Duration::from_secs(5),
    );
    (Arc::new(sync), poller)
}

#[tokio::test]
async fn test_advance_through_kitchen() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();

    let preparing = sync.begin_preparing(&order.order_id).await.unwrap();
    assert_eq!(preparing.status, OrderStatus::Preparing);
    let ready = sync.mark_ready(&order.order_id).await.unwrap();
    assert_eq!(ready.status, OrderStatus::Completed);

    assert_eq!(sync.view().get(&order.order_id).unwrap(), ready);
    assert!(!sync.is_busy(&order.order_id));
}

#[tokio::test]
async fn test_unreachable_server_rolls_back() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();

    backend.fail_next(Fault::Unreachable);
    let err = sync.begin_preparing(&order.order_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(sync.view().get(&order.order_id).unwrap(), order);
}

#[tokio::test]
async fn test_rejection_refreshes_from_server() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();

    // another terminal cancels before the cook taps
    backend.apply_elsewhere(&order.order_id, Transition::Cancel);

    let err = sync.begin_preparing(&order.order_id).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InvalidTransition));
    assert_eq!(
        sync.view().get(&order.order_id).unwrap().status,
        OrderStatus::Cancelled
    );
    assert_eq!(backend.calls("get_order"), 1);
}

#[tokio::test]
async fn test_terminal_order_rejected_locally() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::Preparing);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();
    sync.cancel(&order.order_id, Some("out of milk".into()))
        .await
        .unwrap();

    let err = sync.mark_ready(&order.order_id).await.unwrap_err();
    assert!(matches!(err, ClientError::Transition(_)));
    assert_eq!(backend.calls("transition"), 1);
}

#[tokio::test]
async fn test_second_action_while_in_flight_is_busy() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();
    let gate = backend.hold_transitions();

    let first = tokio::spawn({
        let sync = Arc::clone(&sync);
        let order_id = order.order_id.clone();
        async move { sync.begin_preparing(&order_id).await }
    });
    while !sync.is_busy(&order.order_id) {
        tokio::task::yield_now().await;
    }
    // provisional state is visible while waiting
    assert_eq!(
        sync.view().get(&order.order_id).unwrap().status,
        OrderStatus::Preparing
    );

    let err = sync.mark_ready(&order.order_id).await.unwrap_err();
    assert!(matches!(err, ClientError::Busy(_)));

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(backend.calls("transition"), 1);
}

#[tokio::test]
async fn test_caller_giving_up_does_not_strand_provisional_state() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();
    let gate = backend.hold_transitions();

    let gave_up = tokio::time::timeout(
        Duration::from_millis(50),
        sync.begin_preparing(&order.order_id),
    )
    .await;
    assert!(gave_up.is_err());
    // the request keeps running without its caller
    assert!(sync.is_busy(&order.order_id));

    gate.notify_one();
    while sync.is_busy(&order.order_id) {
        tokio::task::yield_now().await;
    }
    for _ in 0..3 {
        poller.poll_once().await.unwrap();
    }
    let server = backend.order(&order.order_id).unwrap();
    assert_eq!(server.status, OrderStatus::Preparing);
    assert_eq!(sync.view().get(&order.order_id).unwrap(), server);
}

#[tokio::test]
async fn test_caller_giving_up_on_lost_response_converges_by_polling() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();
    let gate = backend.hold_transitions();
    backend.fail_next(Fault::LostResponse);

    let _ = tokio::time::timeout(
        Duration::from_millis(50),
        sync.begin_preparing(&order.order_id),
    )
    .await;
    gate.notify_one();
    while sync.is_busy(&order.order_id) {
        tokio::task::yield_now().await;
    }
    // rolled back, the outcome is unknown to this terminal
    assert_eq!(
        sync.view().get(&order.order_id).unwrap().status,
        OrderStatus::SentToKitchen
    );

    poller.poll_once().await.unwrap();
    let server = backend.order(&order.order_id).unwrap();
    assert_eq!(server.status, OrderStatus::Preparing);
    assert_eq!(sync.view().get(&order.order_id).unwrap(), server);
}

#[tokio::test]
async fn test_late_response_after_terminal_is_discarded() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();
    let gate = backend.hold_transitions();

    let pending = tokio::spawn({
        let sync = Arc::clone(&sync);
        let order_id = order.order_id.clone();
        async move { sync.begin_preparing(&order_id).await }
    });
    while backend.calls("transition") == 0 {
        tokio::task::yield_now().await;
    }

    // the order is cancelled elsewhere and the view learns it first
    backend.apply_elsewhere(&order.order_id, Transition::Cancel);
    assert_eq!(
        sync.refresh(&order.order_id).await.unwrap(),
        Some(Merge::Updated)
    );

    gate.notify_one();
    let late = pending.await.unwrap().unwrap();
    assert_eq!(late.status, OrderStatus::Preparing);
    assert_eq!(
        sync.view().get(&order.order_id).unwrap().status,
        OrderStatus::Cancelled
    );
}

#[tokio::test]
async fn test_poll_after_payment_ages_order_out() {
    let backend = FakeBackend::new();
    let order = backend.seed_order("s-1", OrderStatus::Completed);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();
    assert_eq!(sync.view().len(), 1);

    backend.apply_elsewhere(&order.order_id, Transition::SettlePayment);
    let report = poller.poll_once().await.unwrap();
    assert_eq!(report.removed, 1);
    assert!(sync.view().is_empty());
}

#[tokio::test]
async fn test_failed_poll_keeps_last_view() {
    let backend = FakeBackend::new();
    backend.seed_order("s-1", OrderStatus::SentToKitchen);
    let (sync, poller) = kitchen(&backend);
    poller.poll_once().await.unwrap();

    backend.fail_next(Fault::Unreachable);
    assert!(poller.poll_once().await.is_err());
    assert_eq!(sync.view().len(), 1);
    assert_eq!(poller.failures(), 1);
}
