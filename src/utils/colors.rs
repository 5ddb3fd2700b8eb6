/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Verdict color:
/// granted → green
/// duplicate → yellow
/// late / no entry → red
/// no-op → grey
pub fn color_for_verdict(verdict: &str) -> &'static str {
    match verdict {
        "granted" => GREEN,
        "denied_duplicate" => YELLOW,
        "denied_late" | "denied_no_entry" => RED,
        "no_op" => GREY,
        _ => RESET,
    }
}

pub fn colorize_verdict(verdict: &str) -> String {
    format!("{}{}{}", color_for_verdict(verdict), verdict, RESET)
}
