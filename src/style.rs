//! ANSI escape codes and the few pure formatting helpers the monitor needs.
//! Sequences are emitted unconditionally; most terminals people plug an
//! Arduino into understand them.

use std::io::Write;

use time::OffsetDateTime;

pub const HEADER: &str = "\x1b[95m";
pub const BLUE: &str = "\x1b[94m";
pub const CYAN: &str = "\x1b[96m";
pub const GREEN: &str = "\x1b[92m";
pub const YELLOW: &str = "\x1b[93m";
pub const RED: &str = "\x1b[91m";
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

const RULE_WIDTH: usize = 64;

/// Millisecond-precision wall-clock stamp, `HH:MM:SS.mmm`.
pub fn timestamp(now: OffsetDateTime) -> String {
    let format = time::macros::format_description!(
        version = 2,
        "[hour]:[minute]:[second].[subsecond digits:3]"
    );
    now.format(&format).unwrap_or_default()
}

/// A `====`-style section rule, matching the width of the banner.
pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_banner<W: Write>(out: &mut W) -> std::io::Result<()> {
    let title = format!("Serial Monitor - CLI v{}", env!("CARGO_PKG_VERSION"));
    writeln!(out)?;
    writeln!(out, "{CYAN}{}", "═".repeat(RULE_WIDTH))?;
    writeln!(out, "║{:^width$}║", "", width = RULE_WIDTH - 2)?;
    writeln!(out, "║{title:^width$}║", width = RULE_WIDTH - 2)?;
    writeln!(out, "║{:^width$}║", "", width = RULE_WIDTH - 2)?;
    writeln!(out, "{}{RESET}", "═".repeat(RULE_WIDTH))?;
    writeln!(out)
}
