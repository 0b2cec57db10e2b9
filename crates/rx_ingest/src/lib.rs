//! Scan input layer.
//!
//! Provides the raw-scan value types shared by the whole pipeline and the
//! scanner-artifact corrector that strips known hardware insertion defects
//! before tokenizing. The corrector is pure and fail-soft: text that matches
//! no rule passes through untouched, and nothing here ever errors on domain
//! input.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

mod rules;

pub use rules::{correction_rules, CorrectionRule};

/// Where a scan came from. Determines which correction rules may apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanSource {
    /// Camera frame decoded by an external barcode decoder.
    Camera,
    /// Keyboard-wedge hardware scanner keystrokes.
    HardwareScanner,
    /// Manually typed text.
    Manual,
    /// Pasted text.
    Clipboard,
}

/// An opaque captured scan: the decoded string plus its source tag.
/// Immutable after capture; consumed once by the corrector/tokenizer
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawScanInput {
    pub text: String,
    pub source: ScanSource,
}

impl RawScanInput {
    pub fn new(text: impl Into<String>, source: ScanSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Runtime configuration for artifact correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Semantic version of the correction configuration.
    pub version: u32,
    /// Whether correction runs at all; disabled leaves text untouched.
    #[serde(default = "CorrectionConfig::default_enabled")]
    pub enabled: bool,
}

impl CorrectionConfig {
    fn default_enabled() -> bool {
        true
    }

    /// Reject configurations the corrector cannot honor.
    pub fn validate(&self) -> Result<(), CorrectionError> {
        if self.version == 0 {
            return Err(CorrectionError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            version: 1,
            enabled: true,
        }
    }
}

/// Errors from the correction layer. Only configuration can fail; dirty
/// scan text never does.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    #[error("invalid correction config: {0}")]
    InvalidConfig(String),
}

/// Apply every applicable rewrite rule, in table order, to a raw scan.
///
/// Rules are additive and independent; each fires at most once and only for
/// its scoped source. Text matching no rule is returned unchanged (borrowed,
/// no allocation).
pub fn correct<'a>(text: &'a str, source: ScanSource, cfg: &CorrectionConfig) -> Cow<'a, str> {
    if !cfg.enabled {
        return Cow::Borrowed(text);
    }
    let mut current = Cow::Borrowed(text);
    for rule in correction_rules() {
        if !rule.applies_to(source) {
            continue;
        }
        if rule.pattern.is_match(&current) {
            debug!(rule = rule.name, "scanner artifact corrected");
            let rewritten = rule.pattern.replace(&current, rule.replacement).into_owned();
            current = Cow::Owned(rewritten);
        }
    }
    current
}

/// Correct a captured scan in place of its text, preserving the source tag.
pub fn correct_input(input: &RawScanInput, cfg: &CorrectionConfig) -> RawScanInput {
    RawScanInput {
        text: correct(&input.text, input.source, cfg).into_owned(),
        source: input.source,
    }
}
