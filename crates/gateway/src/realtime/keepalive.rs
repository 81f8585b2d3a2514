use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::connection::Connection;

/// Floor for the ping period; `interval_at` rejects a zero period.
const MIN_PING_PERIOD: Duration = Duration::from_millis(1);

/// Ping the peer every `ping_period` until the connection closes.
///
/// A failed ping closes the handle, which ends the session's read loop; the
/// session itself takes care of unregistering.
pub fn spawn(connection: Arc<Connection>, ping_period: Duration, write_wait: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = ping_period.max(MIN_PING_PERIOD);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = connection.closed() => break,
                _ = ticker.tick() => {
                    if let Err(error) = connection.send(Message::Ping(Vec::new()), write_wait).await {
                        debug!(
                            connection = %connection.id(),
                            error = %error,
                            "Ping failed, closing connection"
                        );
                        connection.close(None, write_wait).await;
                        break;
                    }
                }
            }
        }
    })
}
