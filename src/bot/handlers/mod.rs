use crate::bot::commands::{self, InboundMessage, MentionedUser};
use crate::bot::{Data, Error};
use poise::serenity_prelude as serenity;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("Bot logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            let inbound = inbound_message(new_message);
            if let Some(reply) =
                commands::respond(&data.parser, &data.service, &data.bot_id, &inbound).await
            {
                if let Err(e) = new_message.channel_id.say(&ctx.http, reply).await {
                    tracing::error!("Error sending reply to channel {}: {:?}", inbound.channel_id, e);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn inbound_message(message: &serenity::Message) -> InboundMessage {
    InboundMessage {
        text: message.content.clone(),
        author_id: message.author.id.to_string(),
        author_name: message.author.name.clone(),
        mentions: message
            .mentions
            .iter()
            .map(|user| MentionedUser {
                id: user.id.to_string(),
                name: user.name.clone(),
            })
            .collect(),
        channel_id: message.channel_id.to_string(),
    }
}
