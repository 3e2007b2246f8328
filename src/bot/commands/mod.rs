//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Client lookup, listing and registration commands
pub mod client;

/// General utility commands
pub mod general;

/// Promotion management commands
pub mod promotion;

/// Purchase registration command
pub mod purchase;

/// Dashboard, history and daily withdrawal report commands
pub mod report;

/// Bonus withdrawal command
pub mod withdrawal;

// Export commands
pub use client::*;
pub use general::*;
pub use promotion::*;
pub use purchase::*;
pub use report::*;
pub use withdrawal::*;

/// Discord rejects messages longer than this
const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Joins `lines` under `header`, dropping trailing lines that would push the message
/// past Discord's limit and noting how many were left out.
pub(crate) fn fit_lines(header: &str, lines: &[String]) -> String {
    const RESERVED: usize = 40;
    let budget = DISCORD_MESSAGE_LIMIT - RESERVED;

    let mut text = header.to_string();
    for (shown, line) in lines.iter().enumerate() {
        if text.chars().count() + line.chars().count() + 1 > budget {
            text.push_str(&format!("_…and {} more_", lines.len() - shown));
            return text;
        }
        text.push_str(line);
        text.push('\n');
    }
    text
}
