//! Launch destination chosen by the startup check.

use std::fmt;

use serde::{Deserialize, Serialize};

/// First screen shown after launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartDestination {
    /// No account exists yet; create the owner account.
    #[serde(alias = "signup", alias = "sign_up")]
    Register,
    #[default]
    #[serde(alias = "signin", alias = "login")]
    SignIn,
}

impl StartDestination {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StartDestination::Register => "register",
            StartDestination::SignIn => "sign_in",
        }
    }

    /// Accepts the same spellings as the serde representation, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "register" | "signup" | "sign_up" => Some(StartDestination::Register),
            "sign_in" | "signin" | "login" => Some(StartDestination::SignIn),
            _ => None,
        }
    }
}

impl fmt::Display for StartDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
