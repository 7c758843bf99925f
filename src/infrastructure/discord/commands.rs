//! Slash commands registered by the bot.

use super::dto::{CommandDefinition, CommandOptionDefinition};

const CHAT_INPUT: u8 = 1;
const OPTION_STRING: u8 = 3;
const OPTION_INTEGER: u8 = 4;
const OPTION_ATTACHMENT: u8 = 11;

fn optional(kind: u8, name: &'static str, description: &'static str) -> CommandOptionDefinition {
    CommandOptionDefinition {
        kind,
        name,
        description,
        required: false,
    }
}

fn command(
    name: &'static str,
    description: &'static str,
    options: Vec<CommandOptionDefinition>,
) -> CommandDefinition {
    CommandDefinition {
        name,
        description,
        kind: CHAT_INPUT,
        options,
    }
}

/// Every command the bot answers, in registration order.
#[must_use]
pub fn command_definitions() -> Vec<CommandDefinition> {
    vec![
        command(
            "authorize",
            "Authorize the bot with your Gyazo token",
            vec![optional(
                OPTION_STRING,
                "token",
                "Your Gyazo access token",
            )],
        ),
        command(
            "deauthorize",
            "Remove your stored Gyazo token",
            Vec::new(),
        ),
        command(
            "lastimages",
            "Fetch the most recent images from Gyazo and send them as attachments",
            vec![optional(
                OPTION_INTEGER,
                "count",
                "How many images to send",
            )],
        ),
        command(
            "randomimage",
            "Fetch a random image from Gyazo and send it as an attachment",
            Vec::new(),
        ),
        command(
            "upload",
            "Upload an image to Gyazo from a URL or an attachment",
            vec![
                optional(OPTION_STRING, "url", "Image URL to upload"),
                optional(OPTION_ATTACHMENT, "image", "Image file to upload"),
            ],
        ),
    ]
}
