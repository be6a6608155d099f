use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::BookingError;

/// The mentors students can present to. Every slot belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Teacher {
    Daemen,
    Martina,
}

impl Teacher {
    pub const ALL: [Teacher; 2] = [Teacher::Daemen, Teacher::Martina];

    pub fn as_str(&self) -> &'static str {
        match self {
            Teacher::Daemen => "Daemen",
            Teacher::Martina => "Martina",
        }
    }
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Teacher {
    type Err = BookingError;

    /// Accepts the canonical name in any letter case, so `daemen` in a URL
    /// resolves the same as `Daemen`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Teacher::ALL
            .into_iter()
            .find(|teacher| teacher.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| BookingError::InvalidArgument(format!("Onbekende docent: '{trimmed}'")))
    }
}
