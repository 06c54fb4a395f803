//! Controller configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the controller does when a placement leaves neither side a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
    /// Replace the finished position with a fresh game in the same call.
    #[default]
    AutoReset,
    /// Leave the finished position standing and flag it as game over.
    /// The next accepted call (the forced PASS) restarts the game.
    Report,
}

/// Controller configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub terminal_policy: TerminalPolicy,

    /// Accept `d3` / `pass` as well as the canonical uppercase forms.
    pub case_insensitive_moves: bool,

    /// Reject calls whose claimed sequence differs from the session's.
    /// When off, claimed sequences are ignored.
    pub enforce_sequence: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            terminal_policy: TerminalPolicy::AutoReset,
            case_insensitive_moves: true,
            enforce_sequence: true,
        }
    }
}

impl ControllerConfig {
    /// Loads a config from JSON. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_terminal_policy(mut self, policy: TerminalPolicy) -> Self {
        self.terminal_policy = policy;
        self
    }

    pub fn with_case_insensitive_moves(mut self, enabled: bool) -> Self {
        self.case_insensitive_moves = enabled;
        self
    }

    pub fn with_enforce_sequence(mut self, enabled: bool) -> Self {
        self.enforce_sequence = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reset_automatically_and_check_sequences() {
        let config = ControllerConfig::default();

        assert_eq!(config.terminal_policy, TerminalPolicy::AutoReset);
        assert!(config.case_insensitive_moves);
        assert!(config.enforce_sequence);
    }

    #[test]
    fn from_json_fills_missing_keys() {
        let config = ControllerConfig::from_json(r#"{"terminal_policy": "report"}"#).unwrap();

        assert_eq!(
            config,
            ControllerConfig::default().with_terminal_policy(TerminalPolicy::Report)
        );
        assert_eq!(ControllerConfig::from_json("{}").unwrap(), ControllerConfig::default());
    }

    #[test]
    fn from_json_rejects_unknown_policy() {
        let err = ControllerConfig::from_json(r#"{"terminal_policy": "explode"}"#).unwrap_err();

        assert!(err.to_string().starts_with("invalid controller config"));
    }
}
