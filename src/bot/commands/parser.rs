use crate::bot::commands::{Command, MentionedUser};
use regex::Regex;

/// Classifies message text into a [`Command`].
///
/// Every pattern is anchored at the start of the (trimmed) message and needs
/// whitespace between the prefix and what follows, so `!reputation` or
/// `say !rep ping` never match.
#[derive(Debug, Clone)]
pub struct CommandParser {
    ping: Regex,
    rank: Regex,
    increment: Regex,
}

impl CommandParser {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let prefix = regex::escape(prefix);

        Ok(Self {
            ping: Regex::new(&format!(r"^{}\s+ping\b", prefix))?,
            rank: Regex::new(&format!(r"^{}\s+rank\b", prefix))?,
            increment: Regex::new(&format!(r"^{}\s+<@!?(?<id>\d+)>", prefix))?,
        })
    }

    /// Returns `None` for anything that is not a command.
    pub fn parse(&self, text: &str, mentions: &[MentionedUser]) -> Option<Command> {
        let text = text.trim();

        if self.ping.is_match(text) {
            return Some(Command::Ping);
        }

        if self.rank.is_match(text) {
            return Some(Command::Rank);
        }

        let caps = self.increment.captures(text)?;
        let id = &caps["id"];
        mentions
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .map(|target| Command::Increment { target })
    }
}
