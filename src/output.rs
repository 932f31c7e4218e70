//! # Terminal Output
//!
//! Status lines for the `view-config` commands. Markers are emoji with
//! colors when the terminal supports them and bracketed tags otherwise.
//!
//! Color is decided by the `--color` flag first, then the environment:
//! `NO_COLOR` disables it, `CLICOLOR=0` disables it, `CLICOLOR_FORCE=1`
//! forces it, and `TERM=dumb` disables it. Otherwise `console` checks the
//! terminal.

use std::env;

use console::style;

/// Whether output uses color and emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag (`always`, `never` or `auto`) against the
    /// environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Scan,
    Wrote,
    Failed,
    Done,
}

impl Status {
    fn emoji(self) -> &'static str {
        match self {
            Status::Scan => "🔍",
            Status::Wrote => "📝",
            Status::Failed => "❌",
            Status::Done => "✅",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Status::Scan => "[SCAN]",
            Status::Wrote => "[WROTE]",
            Status::Failed => "[ERR]",
            Status::Done => "[OK]",
        }
    }
}

/// The emoji when color is on, the plain alternative otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// A marker followed by `message`; failures are red and completions green
/// when color is on.
pub fn status_line(config: &OutputConfig, status: Status, message: &str) -> String {
    let marker = emoji(config, status.emoji(), status.tag());
    if !config.use_color {
        return format!("{} {}", marker, message);
    }
    match status {
        Status::Failed => format!("{} {}", marker, style(message).red().force_styling(true)),
        Status::Done => format!("{} {}", marker, style(message).green().force_styling(true)),
        Status::Scan | Status::Wrote => format!("{} {}", marker, message),
    }
}
