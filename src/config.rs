// src/config.rs
use serde::{Deserialize, Serialize};

use crate::error::{NdefError, Result};

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 4;

/// Knobs for message verification.
///
/// Loadable from a partial JSON document; missing keys take their default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// How many smart poster levels may be nested inside the top-level message.
    pub max_nesting_depth: usize,
    /// Android rule: a first record that is neither empty nor unknown must carry a type.
    pub require_type_on_first_record: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            require_type_on_first_record: true,
        }
    }
}

impl VerifyConfig {
    /// Baseline NDEF only, without the platform-specific first-record rule.
    pub fn strict() -> Self {
        Self {
            require_type_on_first_record: false,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Config plus how deep into nested smart posters verification currently is.
#[derive(Clone, Copy, Debug)]
pub(crate) struct VerifyContext<'a> {
    pub config: &'a VerifyConfig,
    pub depth: usize,
}

impl<'a> VerifyContext<'a> {
    pub fn top(config: &'a VerifyConfig) -> Self {
        Self { config, depth: 0 }
    }

    pub fn nested(self) -> Result<Self> {
        let depth = self.depth + 1;
        if depth > self.config.max_nesting_depth {
            return Err(NdefError::NestingTooDeep {
                limit: self.config.max_nesting_depth,
            });
        }
        Ok(Self { depth, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = VerifyConfig::from_json(r#"{ "max_nesting_depth": 1 }"#).unwrap();
        assert_eq!(config.max_nesting_depth, 1);
        assert!(config.require_type_on_first_record);

        let config = VerifyConfig::from_json("{}").unwrap();
        assert_eq!(config, VerifyConfig::default());
    }

    #[test]
    fn strict_drops_first_record_rule() {
        let config = VerifyConfig::strict();
        assert!(!config.require_type_on_first_record);
        assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn nesting_stops_at_limit() {
        let config = VerifyConfig {
            max_nesting_depth: 1,
            ..VerifyConfig::default()
        };
        let ctx = VerifyContext::top(&config).nested().unwrap();
        assert_eq!(ctx.depth, 1);
        assert_eq!(
            ctx.nested().unwrap_err(),
            NdefError::NestingTooDeep { limit: 1 }
        );
    }
}
