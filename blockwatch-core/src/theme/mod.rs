pub mod config;
pub mod palette;
pub mod store;

pub use config::{build, ThemeConfig};
pub use palette::{PointStyle, Rgba};
pub use store::ThemeStore;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BlockwatchError;

/// The two dashboard themes. `tva` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    #[default]
    Tva,
    Cockpit,
}

impl ThemeId {
    pub const ALL: [ThemeId; 2] = [ThemeId::Tva, ThemeId::Cockpit];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Tva => "tva",
            ThemeId::Cockpit => "cockpit",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeId::Tva => "TVA",
            ThemeId::Cockpit => "Cockpit",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemeId::Tva => ThemeId::Cockpit,
            ThemeId::Cockpit => ThemeId::Tva,
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = BlockwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tva" => Ok(ThemeId::Tva),
            "cockpit" => Ok(ThemeId::Cockpit),
            other => Err(BlockwatchError::UnknownTheme(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involution() {
        for theme in ThemeId::ALL {
            assert_ne!(theme.toggled(), theme);
            assert_eq!(theme.toggled().toggled(), theme);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("tva".parse::<ThemeId>().unwrap(), ThemeId::Tva);
        assert_eq!(" Cockpit ".parse::<ThemeId>().unwrap(), ThemeId::Cockpit);
        assert!("solarized".parse::<ThemeId>().is_err());
        assert_eq!(ThemeId::default(), ThemeId::Tva);
    }
}
