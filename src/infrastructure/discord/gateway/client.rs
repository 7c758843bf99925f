use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::connection::{GatewayConnection, GatewayConnectionHandler, WebSocketConnection};
use super::constants::{
    GatewayIntents, MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_BASE, RECONNECT_DELAY_MAX,
    RECONNECT_JITTER_MAX,
};
use super::error::{GatewayError, GatewayResult};
use super::events::GatewayEventKind;
use super::session::SessionInfo;

/// Gateway client settings.
pub struct GatewayClientConfig {
    /// Intents sent with Identify.
    pub intents: GatewayIntents,
    /// Reconnect after recoverable errors.
    pub auto_reconnect: bool,
    /// Consecutive failed attempts before giving up.
    pub max_reconnect_attempts: u32,
}

impl Default for GatewayClientConfig {
    fn default() -> Self {
        Self {
            intents: GatewayIntents::bot_default(),
            auto_reconnect: true,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl GatewayClientConfig {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables reconnecting.
    #[must_use]
    pub const fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Caps consecutive reconnect attempts.
    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }
}

/// Owns the background task that keeps a bot session connected.
pub struct GatewayClient {
    config: GatewayClientConfig,
    running: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
}

impl GatewayClient {
    /// Creates an idle client.
    #[must_use]
    pub fn new(config: GatewayClientConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Creates an idle client with default settings.
    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(GatewayClientConfig::default())
    }

    /// Spawns the gateway task and returns its event stream.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::AlreadyConnected` if the task is already running.
    pub fn connect(
        &mut self,
        token: &str,
    ) -> GatewayResult<mpsc::UnboundedReceiver<GatewayEventKind>> {
        self.spawn(token, || Box::new(WebSocketConnection::new()))
    }

    fn spawn<F>(
        &mut self,
        token: &str,
        connector: F,
    ) -> GatewayResult<mpsc::UnboundedReceiver<GatewayEventKind>>
    where
        F: Fn() -> Box<dyn GatewayConnection> + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(GatewayError::AlreadyConnected);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.shutdown_tx.send_replace(false);

        let config = GatewayLoopConfig {
            token: token.to_string(),
            intents: self.config.intents,
            auto_reconnect: self.config.auto_reconnect,
            max_attempts: self.config.max_reconnect_attempts,
        };
        let running = Arc::clone(&self.running);
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let result = std::panic::AssertUnwindSafe(run_gateway_loop(
                config,
                connector,
                event_tx.clone(),
                shutdown_rx,
            ))
            .catch_unwind()
            .await;

            if let Err(panic_info) = result {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                error!(panic = %panic_msg, "Gateway task panicked");
                let _ = event_tx.send(GatewayEventKind::Error {
                    message: format!("Gateway task panicked: {panic_msg}"),
                    recoverable: false,
                });
            }
            running.store(false, Ordering::SeqCst);
        });

        Ok(event_rx)
    }

    /// Closes the connection and stops reconnecting.
    pub fn disconnect(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Whether the gateway task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

struct GatewayLoopConfig {
    token: String,
    intents: GatewayIntents,
    auto_reconnect: bool,
    max_attempts: u32,
}

async fn run_gateway_loop<F>(
    config: GatewayLoopConfig,
    connector: F,
    event_tx: mpsc::UnboundedSender<GatewayEventKind>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    F: Fn() -> Box<dyn GatewayConnection>,
{
    let mut reconnect_attempts: u32 = 0;
    let mut session = SessionInfo::new();

    while !*shutdown_rx.borrow() {
        let mut handler = GatewayConnectionHandler::new(
            connector(),
            session,
            config.token.clone(),
            config.intents,
            event_tx.clone(),
        );

        let result = match handler.connect().await {
            Ok(()) => {
                info!("Gateway connected");
                reconnect_attempts = 0;
                handler.run(&mut shutdown_rx).await
            }
            Err(e) => Err(e),
        };
        session = handler.into_session();

        let error = match result {
            Ok(()) => break,
            Err(e) => e,
        };

        warn!(error = %error, "Gateway connection lost");
        if !error.can_resume() {
            session.clear();
        }

        if !error.should_reconnect() {
            error!(error = %error, "Gateway error is not recoverable");
            let _ = event_tx.send(GatewayEventKind::Error {
                message: error.to_string(),
                recoverable: false,
            });
            break;
        }

        let _ = event_tx.send(GatewayEventKind::Disconnected {
            reason: error.to_string(),
            can_resume: session.can_resume(),
        });

        if !config.auto_reconnect {
            break;
        }

        reconnect_attempts += 1;
        if reconnect_attempts > config.max_attempts {
            error!(
                attempts = reconnect_attempts - 1,
                "Max reconnection attempts exceeded"
            );
            let _ = event_tx.send(GatewayEventKind::Error {
                message: format!(
                    "Max reconnection attempts ({}) exceeded",
                    config.max_attempts
                ),
                recoverable: false,
            });
            break;
        }

        let delay = calculate_backoff_delay(reconnect_attempts - 1);
        info!(
            attempt = reconnect_attempts,
            delay_ms = delay.as_millis(),
            "Reconnecting to gateway"
        );
        let _ = event_tx.send(GatewayEventKind::Reconnecting {
            attempt: reconnect_attempts,
        });

        tokio::select! {
            () = sleep(delay) => {}
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Gateway loop terminated");
}

#[allow(clippy::cast_possible_truncation)]
fn calculate_backoff_delay(attempt: u32) -> Duration {
    let base_delay = RECONNECT_DELAY_BASE.as_millis() as u64;
    let max_delay = RECONNECT_DELAY_MAX.as_millis() as u64;
    let jitter_max = RECONNECT_JITTER_MAX.as_millis() as u64;

    let exponential_delay = base_delay.saturating_mul(2_u64.saturating_pow(attempt.min(6)));
    let capped_delay = exponential_delay.min(max_delay);

    let jitter = rand::thread_rng().gen_range(0..jitter_max);
    Duration::from_millis(capped_delay.saturating_add(jitter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use super::super::payloads::{GatewayMessage, GatewayPayload};

    /// Connection whose every attempt is closed with a fixed code.
    struct ClosingConnection {
        code: u16,
    }

    #[async_trait]
    impl GatewayConnection for ClosingConnection {
        async fn connect(&mut self, _gateway_url: Option<&str>) -> GatewayResult<()> {
            Ok(())
        }

        async fn disconnect(&mut self) -> GatewayResult<()> {
            Ok(())
        }

        async fn send(&mut self, _payload: &GatewayPayload) -> GatewayResult<()> {
            Ok(())
        }

        async fn receive(&mut self) -> GatewayResult<Option<GatewayMessage>> {
            Err(GatewayError::ConnectionClosed {
                code: self.code,
                reason: "closed".to_string(),
            })
        }

        fn is_connected(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_config_builder() {
        let config = GatewayClientConfig::new()
            .with_auto_reconnect(false)
            .with_max_reconnect_attempts(5);

        assert!(!config.auto_reconnect);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.intents, GatewayIntents::bot_default());
    }

    #[test]
    fn test_backoff_delay() {
        let delay0 = calculate_backoff_delay(0);
        let delay1 = calculate_backoff_delay(1);
        let delay2 = calculate_backoff_delay(2);

        assert!(delay0 < delay1);
        assert!(delay1 < delay2);

        let delay_max = calculate_backoff_delay(100);
        assert!(delay_max <= RECONNECT_DELAY_MAX + RECONNECT_JITTER_MAX);
    }

    #[test]
    fn test_client_initial_state() {
        let client = GatewayClient::with_default_config();
        assert!(!client.is_running());
    }

    #[tokio::test]
    async fn test_fatal_close_stops_without_reconnecting() {
        let mut client = GatewayClient::with_default_config();
        let mut events = client
            .spawn("bad-token", || Box::new(ClosingConnection { code: 4004 }))
            .unwrap();

        let Some(GatewayEventKind::Error {
            message,
            recoverable,
        }) = events.recv().await
        else {
            panic!("expected a fatal error");
        };
        assert!(!recoverable);
        assert!(message.contains("4004"));
        assert!(events.recv().await.is_none());
        assert!(!client.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let mut client =
            GatewayClient::new(GatewayClientConfig::new().with_max_reconnect_attempts(2));
        let mut events = client
            .spawn("token", || Box::new(ClosingConnection { code: 1006 }))
            .unwrap();

        let mut reconnects = Vec::new();
        let mut fatal = None;
        while let Some(event) = events.recv().await {
            match event {
                GatewayEventKind::Reconnecting { attempt } => reconnects.push(attempt),
                GatewayEventKind::Error { message, .. } => fatal = Some(message),
                _ => {}
            }
        }

        assert_eq!(reconnects, vec![1, 2]);
        assert!(fatal.is_some_and(|m| m.contains("(2)")));
    }

    #[tokio::test]
    async fn test_double_connect_is_rejected() {
        let mut client = GatewayClient::with_default_config();
        let _events = client
            .spawn("token", || Box::new(ClosingConnection { code: 4004 }))
            .unwrap();

        assert!(matches!(
            client.spawn("token", || Box::new(ClosingConnection { code: 4004 })),
            Err(GatewayError::AlreadyConnected)
        ));
    }
}
