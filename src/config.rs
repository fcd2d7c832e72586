//! Pipeline configuration.
//!
//! ```toml
//! tag_scheme = "iob2"
//! strict_token_order = true
//! stop_on_failure = false
//! parallel = true
//! ```
//!
//! Missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::bio::TagScheme;
use crate::{Error, Result};

/// Configuration for [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scheme of the NER engine's tags
    pub tag_scheme: TagScheme,
    /// Reject tokenizer output whose token begins decrease within a sentence
    pub strict_token_order: bool,
    /// Skip remaining stages once one fails
    pub stop_on_failure: bool,
    /// Process batches on the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tag_scheme: TagScheme::Plain,
            strict_token_order: true,
            stop_on_failure: true,
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Set the tag scheme.
    #[must_use]
    pub fn with_tag_scheme(mut self, scheme: TagScheme) -> Self {
        self.tag_scheme = scheme;
        self
    }

    /// Set strict token ordering.
    #[must_use]
    pub fn with_strict_token_order(mut self, strict: bool) -> Self {
        self.strict_token_order = strict;
        self
    }

    /// Set whether a failed stage skips the rest.
    #[must_use]
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Set parallel batch processing.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::config(format!("Failed to parse config: {}", e)))
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.tag_scheme, TagScheme::Plain);
        assert!(config.strict_token_order);
        assert!(config.stop_on_failure);
        assert!(config.parallel);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str("tag_scheme = \"iob2\"\nstop_on_failure = false\n").unwrap();
        assert_eq!(config.tag_scheme, TagScheme::Iob2);
        assert!(!config.stop_on_failure);
        assert!(config.strict_token_order);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::default()
            .with_tag_scheme(TagScheme::Iob2)
            .with_parallel(false);
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            PipelineConfig::from_toml_str("tag_scheme = \"bilou\""),
            Err(Error::Config(_))
        ));
        assert!(PipelineConfig::from_toml_str("parallel = ").is_err());
    }
}
