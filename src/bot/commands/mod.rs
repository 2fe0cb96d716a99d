pub mod parser;

use crate::utils::reputation::ReputationService;
use parser::CommandParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionedUser {
    pub id: String,
    pub name: String,
}

/// Platform-independent view of a chat message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub text: String,
    pub author_id: String,
    pub author_name: String,
    pub mentions: Vec<MentionedUser>,
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Rank,
    Increment { target: MentionedUser },
}

/// Runs one message through the parser and the service. `None` means the
/// message is not for us and nothing should be sent.
pub async fn respond(
    parser: &CommandParser,
    service: &ReputationService,
    bot_id: &str,
    message: &InboundMessage,
) -> Option<String> {
    if message.author_id == bot_id {
        return None;
    }

    tracing::debug!(
        "received message: \"{}\" - @{} - {}",
        message.text,
        message.author_name,
        message.author_id
    );

    let reply = match parser.parse(&message.text, &message.mentions)? {
        Command::Ping => {
            tracing::info!("Ping request received");
            service.ping()
        }
        Command::Rank => {
            tracing::info!("Rank request received");
            service.rank().await
        }
        Command::Increment { target } => {
            tracing::info!("Rep increase request received");
            service.increment(&message.author_id, &target).await
        }
    };

    Some(reply)
}
