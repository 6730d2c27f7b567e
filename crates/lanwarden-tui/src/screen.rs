//! Screen trait and screen identifier enum.

use std::fmt;

/// Identifies each TUI screen. Devices and Scans are protected by the
/// session gate; Login is public and kept out of the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    Login,
    #[default]
    Devices, // 1
    Scans, // 2
}

impl ScreenId {
    /// Screens in tab-bar order. Login is reachable only through the gate.
    pub const TABS: [ScreenId; 2] = [Self::Devices, Self::Scans];

    /// Numeric key for this screen. Login has none.
    pub fn number(self) -> u8 {
        match self {
            Self::Login => 0,
            Self::Devices => 1,
            Self::Scans => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Devices),
            2 => Some(Self::Scans),
            _ => None,
        }
    }

    /// Whether entering this screen requires a valid session.
    pub fn protected(self) -> bool {
        !matches!(self, Self::Login)
    }

    /// Short label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Devices => "Devices",
            Self::Scans => "Scans",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_is_the_only_public_screen() {
        assert!(!ScreenId::Login.protected());
        assert!(ScreenId::Devices.protected());
        assert!(ScreenId::Scans.protected());
    }

    #[test]
    fn number_keys_map_to_tabs() {
        assert_eq!(ScreenId::from_number(1), Some(ScreenId::Devices));
        assert_eq!(ScreenId::from_number(2), Some(ScreenId::Scans));
        assert_eq!(ScreenId::from_number(3), None);
    }
}
