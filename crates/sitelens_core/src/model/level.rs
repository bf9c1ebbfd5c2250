//! Three-step level shared by priority, risk and activity classifications.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// `High` above `high`, `Medium` above `medium`, `Low` otherwise.
    ///
    /// Both bounds are exclusive.
    pub fn classify(value: f64, high: f64, medium: f64) -> Self {
        if value > high {
            Self::High
        } else if value > medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Parses a wire label case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "alta" => Some(Self::High),
            "medium" | "normal" | "media" => Some(Self::Medium),
            "low" | "baja" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient decoder for optional level fields; unknown labels become `None`.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Level>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Level::parse))
}
