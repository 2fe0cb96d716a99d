use crate::database::models::RankEntry;

const SCORE_HEADER: &str = "REP";
const NAME_HEADER: &str = "USER";

pub fn format_error_message(error: &str) -> String {
    format!("❌ **Error**: {}", error)
}

pub fn format_welcome_message(name: &str, score: i64) -> String {
    format!("Welcome new user {}! Rep set to {}", name, score)
}

pub fn format_increment_message(name: &str, score: i64) -> String {
    format!("Rep increased to {} for {}", score, name)
}

/// Renders the leaderboard as a light box-drawing table inside a code block.
/// An empty slice still yields the header row.
pub fn format_rank_table(entries: &[RankEntry]) -> String {
    let rows: Vec<(String, &str)> = entries
        .iter()
        .map(|entry| (entry.score.to_string(), entry.display_name.as_str()))
        .collect();

    let score_width = rows
        .iter()
        .map(|(score, _)| score.chars().count())
        .chain(std::iter::once(SCORE_HEADER.len()))
        .max()
        .unwrap_or(SCORE_HEADER.len());
    let name_width = rows
        .iter()
        .map(|(_, name)| name.chars().count())
        .chain(std::iter::once(NAME_HEADER.len()))
        .max()
        .unwrap_or(NAME_HEADER.len());

    let rule = |left: char, mid: char, right: char| {
        format!(
            "{}{}{}{}{}",
            left,
            "─".repeat(score_width + 2),
            mid,
            "─".repeat(name_width + 2),
            right
        )
    };

    let mut table = String::from("```\n");
    table.push_str(&rule('┌', '┬', '┐'));
    table.push('\n');
    table.push_str(&format!(
        "│ {:<sw$} │ {:<nw$} │\n",
        SCORE_HEADER,
        NAME_HEADER,
        sw = score_width,
        nw = name_width
    ));
    table.push_str(&rule('├', '┼', '┤'));
    table.push('\n');
    for (score, name) in &rows {
        table.push_str(&format!(
            "│ {:>sw$} │ {:<nw$} │\n",
            score,
            name,
            sw = score_width,
            nw = name_width
        ));
    }
    table.push_str(&rule('└', '┴', '┘'));
    table.push_str("\n```");
    table
}
