use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, warn};

use super::payloads::GatewayPayload;

/// Requests from background tasks to the connection owner.
#[derive(Debug)]
pub enum ConnectionCommand {
    /// Payload to write to the socket.
    Send(GatewayPayload),
    /// The previous heartbeat was never acknowledged.
    Zombied,
}

/// Keeps the gateway session alive and detects zombied connections.
///
/// The first beat fires after a random fraction of the interval so that many
/// clients reconnecting at once do not beat in lockstep.
pub struct HeartbeatManager {
    interval: Duration,
    sequence: Arc<AtomicU64>,
    ack_received: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatManager {
    /// Creates a stopped manager starting from `sequence`.
    #[must_use]
    pub fn new(interval: Duration, sequence: Option<u64>) -> Self {
        Self {
            interval,
            sequence: Arc::new(AtomicU64::new(sequence.unwrap_or(0))),
            ack_received: Arc::new(AtomicBool::new(true)),
            task: None,
        }
    }

    /// Stores the latest sequence number.
    pub fn record_sequence(&self, sequence: u64) {
        self.sequence.store(sequence, Ordering::SeqCst);
    }

    /// Marks the outstanding heartbeat as acknowledged.
    pub fn record_ack(&self) {
        self.ack_received.store(true, Ordering::SeqCst);
    }

    /// Heartbeat carrying the last seen sequence.
    #[must_use]
    pub fn payload(&self) -> GatewayPayload {
        GatewayPayload::heartbeat(current_sequence(&self.sequence))
    }

    /// Spawns the beat task, replacing any running one.
    pub fn start(&mut self, command_tx: mpsc::Sender<ConnectionCommand>) {
        self.stop();

        let interval = self.interval;
        let first_delay = interval.mul_f64(rand::thread_rng().r#gen::<f64>());
        let sequence = Arc::clone(&self.sequence);
        let ack_received = Arc::clone(&self.ack_received);
        ack_received.store(true, Ordering::SeqCst);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + first_delay, interval);

            loop {
                ticker.tick().await;

                if !ack_received.swap(false, Ordering::SeqCst) {
                    warn!("Heartbeat ACK not received, connection is zombied");
                    let _ = command_tx.send(ConnectionCommand::Zombied).await;
                    break;
                }

                let seq = current_sequence(&sequence);
                let payload = GatewayPayload::heartbeat(seq);
                if command_tx
                    .send(ConnectionCommand::Send(payload))
                    .await
                    .is_err()
                {
                    debug!("Heartbeat channel closed");
                    break;
                }
                debug!(sequence = ?seq, "Sent heartbeat");
            }
        }));
    }

    /// Aborts the beat task.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for HeartbeatManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn current_sequence(sequence: &AtomicU64) -> Option<u64> {
    match sequence.load(Ordering::SeqCst) {
        0 => None,
        seq => Some(seq),
    }
}
