//! Workspace umbrella crate for pharmaceutical scan reconciliation.
//!
//! This crate stitches together artifact correction, GS1 parsing and GTIN
//! normalization so callers can turn raw scan text into a structured
//! identifier, judge it against on-file shipment records, and do both
//! through a single API entry point.
//!
//! ```
//! use rxscan::{parse_scan_text, ScanSource};
//!
//! let parsed = parse_scan_text(
//!     "(01)00312345678906(17)220615(10)ABC123(21)XYZ987",
//!     ScanSource::Camera,
//! );
//! assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
//! assert_eq!(parsed.lot_number.as_deref(), Some("ABC123"));
//! ```

pub use rx_gtin::{
    check_digit, decompose, is_case_level, normalize_to_gtin14, registry, to_case_level,
    to_item_level, validate, GtinLayout, GtinParts, ManufacturerRule, ReferenceRewrite, Sgtin,
    SgtinError,
};
pub use rx_ingest::{
    correct, correct_input, correction_rules, CorrectionConfig, CorrectionError, CorrectionRule,
    RawScanInput, ScanSource,
};
pub use rx_match::{
    compare, compare_with_config, matches_record, set_reconcile_metrics, EpcisShipmentFields,
    MatchConfig, MatchError, MatchVerdict, ReconcileMetrics, VerdictTier,
};
pub use rx_parse::{
    detect_format, parse, ApplicationIdentifierEntry, ParseConfig, ParseError, ParsedIdentifier,
    ScanFormat,
};

use std::error::Error;
use std::fmt;

use tracing::debug;

/// Errors that can occur while configuring the scan pipeline. Scan text
/// itself never produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Correction(CorrectionError),
    Parse(ParseError),
    Match(MatchError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Correction(err) => write!(f, "correction failure: {err}"),
            PipelineError::Parse(err) => write!(f, "parse failure: {err}"),
            PipelineError::Match(err) => write!(f, "match failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Correction(err) => Some(err),
            PipelineError::Parse(err) => Some(err),
            PipelineError::Match(err) => Some(err),
        }
    }
}

impl From<CorrectionError> for PipelineError {
    fn from(value: CorrectionError) -> Self {
        PipelineError::Correction(value)
    }
}

impl From<ParseError> for PipelineError {
    fn from(value: ParseError) -> Self {
        PipelineError::Parse(value)
    }
}

impl From<MatchError> for PipelineError {
    fn from(value: MatchError) -> Self {
        PipelineError::Match(value)
    }
}

/// Configuration for the end-to-end scan pipeline.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScanPipelineConfig {
    pub correction: CorrectionConfig,
    pub parse: ParseConfig,
    pub matching: MatchConfig,
}

impl ScanPipelineConfig {
    /// Validate every stage configuration.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.correction.validate()?;
        self.parse.validate()?;
        self.matching.validate()?;
        Ok(())
    }
}

/// Run one captured scan through the full pipeline with explicit
/// configuration: artifact correction, then format detection and parsing,
/// then GTIN normalization.
pub fn parse_scan(
    raw: &RawScanInput,
    cfg: &ScanPipelineConfig,
) -> Result<ParsedIdentifier, PipelineError> {
    cfg.validate()?;
    let corrected = correct_input(raw, &cfg.correction);
    if corrected.text != raw.text {
        debug!(source = ?raw.source, "scan text corrected before parse");
    }
    Ok(parse(&corrected, &cfg.parse))
}

/// Convenience entry point with default configuration. Infallible: dirty
/// input degrades to an identifier with empty fields, never an error.
pub fn parse_scan_text(text: &str, source: ScanSource) -> ParsedIdentifier {
    let raw = RawScanInput::new(text, source);
    let corrected = correct_input(&raw, &CorrectionConfig::default());
    parse(&corrected, &ParseConfig::default())
}

/// Score a parsed scan against an on-file shipment record.
pub fn reconcile(scanned: &ParsedIdentifier, on_file: &EpcisShipmentFields) -> MatchVerdict {
    compare(scanned, &on_file.to_identifier())
}

/// Accept or reject a parsed scan against the specific record it is
/// expected to fulfil.
pub fn accept_scan(scanned: &ParsedIdentifier, expected: &EpcisShipmentFields) -> bool {
    matches_record(scanned, expected)
}
