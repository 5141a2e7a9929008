//! UI utilities for Pandash CLI.

use std::path::{Path, PathBuf};

use pandash_core::api::QueuesSummary;
use pandash_core::dashboard::queue::QueueCounters;

/// Width of the rules printed under table headings.
pub const RULE_WIDTH: usize = 60;

/// A horizontal rule.
pub fn rule() -> String {
    "─".repeat(RULE_WIDTH)
}

/// Print a heading followed by a rule.
pub fn heading(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", rule());
}

/// Show only the ends of an API key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// One-line queue counters, e.g. "pending 2  running 1  completed 0  failed 0".
pub fn format_counters(counters: &QueueCounters) -> String {
    format!(
        "pending {}  running {}  completed {}  failed {}",
        counters.pending, counters.running, counters.completed, counters.failed
    )
}

/// Pending and running totals across all accounts, as shown in the dashboard header.
pub fn format_summary(totals: &QueuesSummary) -> String {
    format!(
        "transfer {} pending {} running  share {} pending {} running",
        totals.total_transfer_pending,
        totals.total_transfer_running,
        totals.total_share_pending,
        totals.total_share_running
    )
}

/// Worker loop state as shown next to a queue heading.
pub const fn loop_state(is_running: bool, is_paused: bool) -> &'static str {
    match (is_running, is_paused) {
        (_, true) => "paused",
        (true, false) => "running",
        (false, false) => "stopped",
    }
}

/// Where to write an export: the explicit path, or `name` inside `directory`.
pub fn output_path(explicit: Option<PathBuf>, directory: &Path, name: &str) -> PathBuf {
    explicit.unwrap_or_else(|| directory.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("0123456789abcdef"), "0123…cdef");
        assert_eq!(mask_key("short"), "•••••");
        assert_eq!(mask_key(""), "");
    }

    #[test]
    fn test_format_counters() {
        let counters = QueueCounters {
            pending: 2,
            running: 1,
            completed: 0,
            failed: 0,
        };
        assert_eq!(
            format_counters(&counters),
            "pending 2  running 1  completed 0  failed 0"
        );
    }

    #[test]
    fn test_format_summary() {
        let totals = QueuesSummary {
            total_transfer_pending: 3,
            total_transfer_running: 1,
            total_share_pending: 0,
            total_share_running: 2,
            total_transfer_failed: 9,
            ..QueuesSummary::default()
        };
        assert_eq!(
            format_summary(&totals),
            "transfer 3 pending 1 running  share 0 pending 2 running"
        );
    }

    #[test]
    fn test_loop_state() {
        assert_eq!(loop_state(true, false), "running");
        assert_eq!(loop_state(true, true), "paused");
        assert_eq!(loop_state(false, false), "stopped");
    }

    #[test]
    fn test_output_path() {
        let dir = Path::new("/tmp/exports");
        assert_eq!(
            output_path(None, dir, "a.csv"),
            PathBuf::from("/tmp/exports/a.csv")
        );
        assert_eq!(
            output_path(Some(PathBuf::from("b.csv")), dir, "a.csv"),
            PathBuf::from("b.csv")
        );
    }
}
