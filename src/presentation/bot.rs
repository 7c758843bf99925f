//! Gateway event loop driving command handling.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace, warn};

use crate::application::CommandRouter;
use crate::infrastructure::discord::{
    DiscordRestClient, DispatchEvent, GatewayClient, GatewayError, GatewayEventKind,
    command_definitions,
};

/// Reasons the bot stopped on its own.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("gateway stopped: {message}")]
    Fatal { message: String },
}

/// Connects to Discord and answers slash commands until stopped.
pub struct Bot {
    gateway: GatewayClient,
    rest: Arc<DiscordRestClient>,
    router: CommandRouter,
    commands_registered: bool,
    in_flight: JoinSet<()>,
}

impl Bot {
    /// Creates a bot from its gateway, REST client and router.
    #[must_use]
    pub fn new(gateway: GatewayClient, rest: Arc<DiscordRestClient>, router: CommandRouter) -> Self {
        Self {
            gateway,
            rest,
            router,
            commands_registered: false,
            in_flight: JoinSet::new(),
        }
    }

    /// Runs until Ctrl-C or a fatal gateway error.
    ///
    /// Commands still being handled are allowed to finish before returning.
    ///
    /// # Errors
    /// Returns error if the gateway cannot start or stops for good.
    pub async fn run(mut self, token: &str) -> Result<(), BotError> {
        let events = self.gateway.connect(token)?;
        info!("Bot started");

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        };

        let result = self.process(events, shutdown).await;
        self.gateway.disconnect();
        result
    }

    async fn process(
        &mut self,
        mut events: mpsc::UnboundedReceiver<GatewayEventKind>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), BotError> {
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                () = &mut shutdown => break Ok(()),

                event = events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle_gateway_event(event).await {
                            break Err(e);
                        }
                    }
                    None => break Ok(()),
                },

                Some(joined) = self.in_flight.join_next() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Command task failed");
                    }
                }
            }
        };

        self.drain().await;
        result
    }

    async fn handle_gateway_event(&mut self, event: GatewayEventKind) -> Result<(), BotError> {
        match event {
            GatewayEventKind::Connected { session_id } => {
                info!(session_id = %session_id, "Gateway connected");
            }
            GatewayEventKind::Disconnected { reason, can_resume } => {
                warn!(reason = %reason, can_resume, "Gateway disconnected");
            }
            GatewayEventKind::Reconnecting { attempt } => {
                info!(attempt, "Gateway reconnecting");
            }
            GatewayEventKind::Resumed => info!("Gateway session resumed"),
            GatewayEventKind::Dispatch(dispatch) => self.handle_dispatch_event(dispatch).await,
            GatewayEventKind::Error {
                message,
                recoverable,
            } => {
                if !recoverable {
                    error!(error = %message, "Fatal gateway error");
                    return Err(BotError::Fatal { message });
                }
                warn!(error = %message, "Recoverable gateway error");
            }
        }
        Ok(())
    }

    async fn handle_dispatch_event(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::Ready {
                user_id,
                application_id,
                ..
            } => {
                info!(user_id = %user_id, application_id = %application_id, "Logged in");
                if !self.commands_registered {
                    self.register_commands(&application_id).await;
                }
            }
            DispatchEvent::InteractionCreate { interaction } => {
                let router = self.router.clone();
                self.in_flight.spawn(async move {
                    router.handle(interaction).await;
                });
            }
            DispatchEvent::Unknown { event_type } => {
                trace!(event = %event_type, "Ignoring dispatch");
            }
        }
    }

    async fn register_commands(&mut self, application_id: &str) {
        let commands = command_definitions();
        match self.rest.register_commands(application_id, &commands).await {
            Ok(()) => {
                info!(count = commands.len(), "Slash commands registered");
                self.commands_registered = true;
            }
            // Retried on the next Ready.
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }
    }

    async fn drain(&mut self) {
        if !self.in_flight.is_empty() {
            debug!(pending = self.in_flight.len(), "Waiting for commands to finish");
        }
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Command task failed");
            }
        }
    }
}
