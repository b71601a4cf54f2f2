//! End-to-end flows: dispatcher + synchronizer against an in-process authority

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use urgency_timer::{
    client::{InMemoryTimerClient, TimerClient},
    error::CommandError,
    presentation::{FacialExpression, UrgencyLevel},
    state::{TimerId, TimerStatus, ViewState},
    sync::CommandDispatcher,
};

const POLL: Duration = Duration::from_millis(500);
/// Long enough for at least one full poll tick to land
const SETTLE: Duration = Duration::from_millis(600);

fn mount_view() -> (CommandDispatcher, Arc<InMemoryTimerClient>) {
    let store = Arc::new(InMemoryTimerClient::new());
    let client: Arc<dyn TimerClient> = store.clone();
    let view = Arc::new(ViewState::new(60));
    (CommandDispatcher::new(client, view, POLL), store)
}

#[tokio::test(start_paused = true)]
async fn configure_start_and_fetch_round_trip() {
    let (commands, store) = mount_view();
    let timer = commands.configure(60).await.unwrap();
    commands.start().await.unwrap();

    let fetched = store.get(&timer.id).await.unwrap();
    assert_eq!(fetched.remaining_seconds, 60);
    assert_eq!(fetched.status, TimerStatus::Running);

    commands.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn presentation_tracks_remote_countdown() {
    let (commands, store) = mount_view();
    let timer = commands.configure(30).await.unwrap();
    commands.start().await.unwrap();

    // a third left: still the medium band under the 50/25/10 thresholds
    store.advance(&timer.id, 20);
    sleep(SETTLE).await;
    let shown = commands.state().presentation();
    assert_eq!(shown.remaining_seconds, 10);
    assert_eq!(shown.urgency_level, UrgencyLevel::Medium);
    assert_eq!(shown.facial_expression, FacialExpression::Concerned);

    // ten percent left: critical and red-biased
    store.advance(&timer.id, 7);
    sleep(SETTLE).await;
    let shown = commands.state().presentation();
    assert_eq!(shown.remaining_seconds, 3);
    assert_eq!(shown.urgency_level, UrgencyLevel::Critical);
    assert!(shown.urgency_ratio >= 0.9);
    assert_eq!(shown.colour.red, 255);
    assert!(shown.colour.green <= 51);
    assert_eq!(shown.facial_expression, FacialExpression::Critical);
    assert!(shown.pulsing);

    commands.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn expiry_is_terminal_until_reset() {
    let (commands, store) = mount_view();
    let timer = commands.configure(10).await.unwrap();
    commands.start().await.unwrap();

    store.advance(&timer.id, 10);
    sleep(SETTLE).await;
    let shown = commands.state().presentation();
    assert_eq!(shown.status, TimerStatus::Expired);
    assert_eq!(shown.facial_expression, FacialExpression::Defeated);
    assert_eq!(shown.colour_hex, "#FF0000");
    assert!(!commands.poller().is_attached(&timer.id));

    let err = commands.pause().await.unwrap_err();
    assert!(err.is_rejected());

    let reset = commands.reset(false).await.unwrap();
    assert_eq!(reset.status, TimerStatus::Idle);
    assert_eq!(reset.remaining_seconds, reset.initial_duration_seconds);
    assert_eq!(commands.state().presentation().error, None);

    commands.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn paused_timer_does_not_drift() {
    let (commands, store) = mount_view();
    let timer = commands.configure(60).await.unwrap();
    commands.start().await.unwrap();

    store.advance(&timer.id, 45);
    sleep(SETTLE).await;
    let paused = commands.pause().await.unwrap();
    assert_eq!(paused.remaining_seconds, 15);
    assert!(!commands.poller().is_attached(&timer.id));

    // the remote clock is frozen while paused
    store.advance(&timer.id, 10);
    sleep(Duration::from_secs(3)).await;
    assert_eq!(commands.state().presentation().remaining_seconds, 15);

    let resumed = commands.resume().await.unwrap();
    assert_eq!(resumed.remaining_seconds, 15);
    assert_eq!(resumed.status, TimerStatus::Running);
    assert!(commands.poller().is_attached(&timer.id));

    commands.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn reset_with_restart_keeps_polling() {
    let (commands, store) = mount_view();
    let timer = commands.configure(40).await.unwrap();
    commands.start().await.unwrap();
    store.advance(&timer.id, 25);
    sleep(SETTLE).await;

    let restarted = commands.reset(true).await.unwrap();
    assert_eq!(restarted.status, TimerStatus::Running);
    assert_eq!(restarted.remaining_seconds, 40);
    assert!(commands.poller().is_attached(&timer.id));
    assert_eq!(commands.poller().active_sessions(), 1);

    commands.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_pause_joins_the_outstanding_request() {
    let (commands, store) = mount_view();
    commands.configure(60).await.unwrap();
    commands.start().await.unwrap();
    store.set_mutation_latency(Duration::from_millis(200));
    let before = store.mutation_count();

    let (a, b) = tokio::join!(commands.pause(), commands.pause());

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(store.mutation_count(), before + 1);

    commands.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn transient_outage_shows_last_good_state_then_recovers() {
    let (commands, store) = mount_view();
    let timer = commands.configure(60).await.unwrap();
    commands.start().await.unwrap();
    store.advance(&timer.id, 10);
    sleep(SETTLE).await;

    store.set_unreachable(true);
    store.advance(&timer.id, 10);
    sleep(SETTLE).await;
    let shown = commands.state().presentation();
    assert!(shown.is_polling_error);
    assert_eq!(shown.remaining_seconds, 50);
    assert!(commands.poller().is_attached(&timer.id));

    // a failing command is reported but leaves the snapshot alone
    let err = commands.pause().await.unwrap_err();
    assert!(matches!(err, CommandError::Remote(_)));
    assert_eq!(commands.state().presentation().status, TimerStatus::Running);

    store.set_unreachable(false);
    sleep(SETTLE).await;
    let shown = commands.state().presentation();
    assert!(!shown.is_polling_error);
    assert_eq!(shown.error, None);
    assert_eq!(shown.remaining_seconds, 40);

    commands.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_every_fetch() {
    let (commands, store) = mount_view();
    commands.configure(60).await.unwrap();
    commands.start().await.unwrap();
    sleep(Duration::from_secs(2)).await;

    commands.teardown().await;
    assert_eq!(commands.poller().active_sessions(), 0);

    let fetches = store.fetch_count();
    sleep(Duration::from_secs(10)).await;
    assert_eq!(store.fetch_count(), fetches);
}

#[tokio::test(start_paused = true)]
async fn command_in_flight_at_teardown_cannot_restart_polling() {
    let (commands, store) = mount_view();
    commands.configure(60).await.unwrap();
    store.set_mutation_latency(Duration::from_millis(300));

    let pending = tokio::spawn({
        let commands = commands.clone();
        async move { commands.start().await }
    });
    sleep(Duration::from_millis(100)).await;
    commands.teardown().await;

    // the remote start still lands, but no session may come of it
    let started = pending.await.unwrap().unwrap();
    assert_eq!(started.status, TimerStatus::Running);
    assert_eq!(commands.poller().active_sessions(), 0);

    let fetches = store.fetch_count();
    sleep(Duration::from_secs(3)).await;
    assert_eq!(store.fetch_count(), fetches);
    assert_eq!(commands.poller().active_sessions(), 0);

    assert_eq!(commands.pause().await.unwrap_err(), CommandError::TornDown);
    assert_eq!(store.fetch_count(), fetches);
}

#[tokio::test(start_paused = true)]
async fn concurrent_configures_create_a_single_timer() {
    let (commands, store) = mount_view();
    store.set_create_latency(Duration::from_millis(200));

    let (a, b) = tokio::join!(commands.configure(30), commands.configure(90));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a, b);
    assert_eq!(store.peek(&a.id).map(|t| t.initial_duration_seconds), Some(30));
    assert!(store.peek(&TimerId::new("timer-2")).is_none());

    // a later configure still replaces and deletes the survivor
    let replaced = commands.configure(90).await.unwrap();
    assert!(store.peek(&a.id).is_none());
    assert_eq!(store.peek(&replaced.id).map(|t| t.initial_duration_seconds), Some(90));
}

#[tokio::test(start_paused = true)]
async fn updates_are_published_to_subscribers() {
    let (commands, store) = mount_view();
    let mut updates = commands.state().subscribe();
    let timer = commands.configure(20).await.unwrap();
    commands.start().await.unwrap();

    store.advance(&timer.id, 5);
    sleep(SETTLE).await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().remaining_seconds, 15);

    commands.teardown().await;
}
