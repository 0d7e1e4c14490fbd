//! Terminal output for adopt-check.
//!
//! Banner, the in-place progress line, and the end-of-run summary. Uses only
//! the `console` crate. Styling is dropped automatically when stdout is not a
//! terminal.

use adopt_check_lib::{ProgressSnapshot, RunCounters};
use console::{style, Term};
use std::path::Path;
use std::time::Duration;

use crate::RunSettings;

const RULE_WIDTH: usize = 70;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print the run banner.
pub fn print_banner() {
    println!("{}", rule());
    println!(
        "{} {}",
        style("Adopt Me Group Checker").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
    );
    println!("{}", rule());
}

/// Print the loaded count and the effective settings.
pub fn print_run_config(total: usize, settings: &RunSettings) {
    println!("Loaded {} usernames", style(format_count(total)).bold());
    println!(
        "{}",
        style(format!(
            "Workers: {} | Delay: {:.2}s | Timeout: {}s | Group: {}",
            settings.check.threads,
            settings.check.delay.as_secs_f64(),
            settings.check.timeout.as_secs_f64(),
            settings.check.group_id,
        ))
        .dim()
    );
    println!("Output: {}", settings.output.display());
    println!();
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// Rewrite the progress line in place.
pub fn print_progress(term: &Term, snapshot: &ProgressSnapshot) {
    let line = snapshot.status_line();
    if term.is_term() {
        let _ = term.clear_line();
        let _ = term.write_str(&line);
    } else {
        let _ = term.write_str(&format!("\r{}", line));
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the end-of-run summary.
pub fn print_summary(counters: &RunCounters, total: usize, elapsed: Duration, output: &Path) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        counters.checked as f64 / secs
    } else {
        0.0
    };

    println!();
    println!();
    println!("{}", rule());
    println!("{}", style("Checking completed!").bold());
    println!("{}", rule());
    println!("Total checked: {}", format_count(counters.checked));
    println!(
        "Found: {}",
        style(format!(
            "{} ({:.1}%)",
            format_count(counters.found),
            counters.found_percentage(total)
        ))
        .green()
    );
    let errors = format_count(counters.errors);
    if counters.errors > 0 {
        println!("Errors: {}", style(errors).yellow());
    } else {
        println!("Errors: {}", errors);
    }
    println!("Total time: {:.1} minutes", secs / 60.0);
    println!("Average rate: {:.1} users/second", rate);
    println!();
    println!("Results saved to: {}", style(output.display()).cyan());
    println!("{}", rule());
}

/// Print the notice for a run stopped with Ctrl-C.
pub fn print_interrupted(rows_written: usize, output: &Path) {
    println!();
    println!();
    println!("{}", style("Interrupted by user.").yellow());
    println!(
        "{} results written to {}",
        format_count(rows_written),
        output.display()
    );
}

/// Print a failure that ended the run after checking started.
pub fn print_run_error(message: &str) {
    println!();
    println!();
    println!("{} {}", style("Error:").red().bold(), message);
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Format a count with thousands separators, e.g. `12,345`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_small() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn test_format_count_separators() {
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(12_345), "12,345");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_rule_width() {
        assert_eq!(rule().len(), 70);
        assert!(rule().chars().all(|c| c == '='));
    }
}
