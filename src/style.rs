//! Colors, glyphs and the small normalizations shared by both footer lines.

use std::borrow::Cow;

pub const RESET: &str = "\x1b[0m";

pub const GREEN: &str = "\x1b[0;32m";
pub const YELLOW: &str = "\x1b[0;33m";
pub const RED: &str = "\x1b[0;31m";
pub const CYAN: &str = "\x1b[0;36m";
pub const BLUE: &str = "\x1b[0;34m";
pub const WHITE: &str = "\x1b[0;37m";

// Dim variants
pub const DIM_GREEN: &str = "\x1b[2;32m";
pub const DIM_YELLOW: &str = "\x1b[2;33m";
pub const DIM_RED: &str = "\x1b[2;31m";
pub const DIM_WHITE: &str = "\x1b[2;37m";
pub const DIM_CYAN: &str = "\x1b[2;36m";
pub const DIM_MAGENTA: &str = "\x1b[2;35m";

/// Wrap `text` in `color` and a trailing reset.
pub fn paint(color: &str, text: &str) -> String {
    format!("{color}{text}{RESET}")
}

/// Marker appended to a line that had to be cut.
pub fn ellipsis() -> String {
    paint(DIM_WHITE, "...")
}

/// Reasoning effort reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThinkingLevel {
    #[default]
    Off,
    Minimal,
    Low,
    Medium,
    High,
    XHigh,
}

impl ThinkingLevel {
    /// Unknown levels are treated as `Off`.
    pub fn parse(level: &str) -> Self {
        match level {
            "minimal" => Self::Minimal,
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "xhigh" => Self::XHigh,
            _ => Self::Off,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Off => "",
            Self::Minimal => "✧",
            Self::Low => "✦",
            Self::Medium => "◆",
            Self::High => "❖",
            Self::XHigh => "✹",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Off | Self::Minimal => DIM_WHITE,
            Self::Low => DIM_CYAN,
            Self::Medium => CYAN,
            Self::High => DIM_MAGENTA,
            Self::XHigh => YELLOW,
        }
    }

    /// Colored glyph, or an empty string for `Off`.
    pub fn render(self) -> String {
        let symbol = self.symbol();
        if symbol.is_empty() {
            return String::new();
        }
        paint(self.color(), symbol)
    }
}

/// Strip a leading "Claude" plus whitespace, in any case; blank names become "Claude".
pub fn normalize_model(model: &str) -> Cow<'_, str> {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        return Cow::Borrowed("Claude");
    }
    let stripped = match trimmed.get(..6).zip(trimmed.get(6..)) {
        Some((prefix, rest))
            if prefix.eq_ignore_ascii_case("claude") && rest.starts_with(char::is_whitespace) =>
        {
            rest.trim_start()
        }
        _ => trimmed,
    };
    if stripped.is_empty() {
        Cow::Borrowed("Claude")
    } else {
        Cow::Borrowed(stripped)
    }
}

/// Replace a leading home directory with `~`.
pub fn normalize_path<'a>(path: &'a str, home: &str) -> Cow<'a, str> {
    if home.is_empty() {
        return Cow::Borrowed(path);
    }
    if path == home {
        return Cow::Borrowed("~");
    }
    match path.strip_prefix(home) {
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => {
            Cow::Owned(format!("~{rest}"))
        }
        _ => Cow::Borrowed(path),
    }
}

/// Format milliseconds as `XhYm`.
pub fn format_elapsed(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    format!("{hours}h{minutes}m")
}
