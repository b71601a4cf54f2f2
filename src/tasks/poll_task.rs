//! Periodic snapshot fetch for one poll session

use std::sync::Arc;

use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

use crate::{
    state::TimerId,
    sync::poller::{PollShared, Settled},
};

/// Fetch loop of a single session.
///
/// The next fetch is only issued after the previous one settled; ticks that
/// fire while a fetch is outstanding are skipped. The loop ends when the
/// session is stopped or when `settle` says the session is gone.
pub(crate) async fn poll_task(
    shared: Arc<PollShared>,
    timer_id: TimerId,
    token: u64,
    mut stop_rx: watch::Receiver<bool>,
) {
    debug!("Poll session #{} for timer {} started", token, timer_id);

    let mut ticker = interval(shared.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            // Stop requested or session dropped
            _ = stop_rx.changed() => {
                debug!("Poll session #{} for timer {} stopped", token, timer_id);
                break;
            }

            _ = ticker.tick() => {}
        }

        // Not raced against the stop signal: an in-flight fetch completes and
        // `settle` decides whether its result still counts.
        let result = shared.client.get(&timer_id).await;
        if shared.settle(&timer_id, token, result) == Settled::Stop {
            break;
        }
    }

    debug!("Poll session #{} for timer {} finished", token, timer_id);
}
