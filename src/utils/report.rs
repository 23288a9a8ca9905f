// src/utils/report.rs

//! Console report formatting for the CLI.
//!
//! Produces the same `[timestamp] [LEVEL] message` layout for every line so
//! hero listings, search results and the message panel read consistently.

use chrono::Local;

use crate::models::Hero;
use crate::notify::Message;

/// Format a line with timestamp and level.
pub fn format_line(level: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level, message)
}

/// Format one hero as a table row.
pub fn format_hero(hero: &Hero) -> String {
    format!("{:>6}  {}", hero.id, hero.name)
}

/// Print a boxed section header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line("INFO", &border));
    println!("{}", format_line("INFO", &format!("  {}", title)));
    println!("{}", format_line("INFO", &border));
}

/// Print an indented line under a header.
pub fn sub_item(message: &str) {
    println!("{}", format_line("INFO", &format!("    {}", message)));
}

/// Print a list of heroes under a header.
pub fn heroes(title: &str, heroes: &[Hero]) {
    header(title);
    if heroes.is_empty() {
        sub_item("(none)");
        return;
    }
    for hero in heroes {
        sub_item(&format_hero(hero));
    }
}

/// Print the notification messages, oldest first.
pub fn messages(entries: &[Message]) {
    if entries.is_empty() {
        return;
    }
    println!();
    let title = format!("[MESSAGES] {}", entries.len());
    println!("{}", format_line("INFO", &title));
    for entry in entries {
        println!(
            "    {}  {}",
            entry.recorded_at.format("%H:%M:%S%.3f"),
            entry.text
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hero_aligns_id() {
        assert_eq!(format_hero(&Hero::new(11, "Dr Nice")), "    11  Dr Nice");
    }

    #[test]
    fn test_format_line_layout() {
        let line = format_line("WARN", "careful");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] [WARN] careful"));
    }
}
