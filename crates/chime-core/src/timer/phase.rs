use serde::{Deserialize, Serialize};

/// The timer's current activity segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Focus)
    }

    /// Identifier handed to the expiration page.
    ///
    /// Without a long-break cadence a short break is just a "break".
    pub fn page_id(self, has_long_break: bool) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::ShortBreak if has_long_break => "short-break",
            Phase::ShortBreak => "break",
            Phase::LongBreak => "long-break",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.page_id(true))
    }
}
