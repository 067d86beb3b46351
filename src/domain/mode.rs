use std::fmt;

/// Listing order requested from a content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Hot, Mode::New, Mode::Top, Mode::Rising];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Hot => "hot",
            Mode::New => "new",
            Mode::Top => "top",
            Mode::Rising => "rising",
        }
    }

    /// Parse a mode name; anything unrecognized falls back to [`Mode::Hot`].
    pub fn parse_or_hot(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "new" => Mode::New,
            "top" => Mode::Top,
            "rising" => Mode::Rising,
            _ => Mode::Hot,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
