//! Discord adapters: gateway session, interaction parsing and REST replies.

/// Slash command definitions.
pub mod commands;
mod dto;
/// Gateway connection and events.
pub mod gateway;
/// Interaction payload parsing.
pub mod interaction;
mod rest;

pub use commands::command_definitions;
pub use dto::CommandDefinition;
pub use gateway::{
    DispatchEvent, GatewayClient, GatewayClientConfig, GatewayError, GatewayEventKind,
    GatewayIntents,
};
pub use rest::DiscordRestClient;
