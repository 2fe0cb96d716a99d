pub mod commands;
pub mod handlers;

use crate::config::Config;
use crate::utils::reconcile::{NameResolver, reconcile_display_names};
use crate::utils::reputation::ReputationService;
use anyhow::{Context as _, Result};
use commands::parser::CommandParser;
use poise::serenity_prelude as serenity;
use std::future::Future;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct Data {
    pub service: ReputationService,
    pub parser: CommandParser,
    pub bot_id: String,
}

pub async fn create_bot(config: Config, service: ReputationService) -> Result<serenity::Client> {
    let parser = CommandParser::new(&config.command_prefix)
        .with_context(|| format!("invalid command prefix '{}'", config.command_prefix))?;
    let token = config.discord_token.clone();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                if config.reconcile_names {
                    let resolver = HttpNameResolver {
                        http: ctx.http.clone(),
                    };
                    if let Err(e) = reconcile_display_names(service.store(), &resolver).await {
                        tracing::error!("Name reconciliation failed: {}", e);
                    }
                }

                Ok(Data {
                    service,
                    parser,
                    bot_id: ready.user.id.to_string(),
                })
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .context("error creating Discord session")?;

    Ok(client)
}

/// Resolves names through the Discord REST API.
pub struct HttpNameResolver {
    http: Arc<serenity::Http>,
}

impl NameResolver for HttpNameResolver {
    fn current_name(&self, user_id: &str) -> impl Future<Output = anyhow::Result<String>> + Send {
        let http = self.http.clone();
        let user_id = user_id.to_string();

        async move {
            let id: u64 = user_id
                .parse()
                .ok()
                .filter(|id| *id != 0)
                .ok_or_else(|| anyhow::anyhow!("'{}' is not a Discord user id", user_id))?;
            let user = http.get_user(serenity::UserId::new(id)).await?;
            Ok(user.name)
        }
    }
}
