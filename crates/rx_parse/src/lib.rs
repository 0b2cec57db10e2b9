//! # Scan parsing pipeline
//!
//! Turns an ambiguous, inconsistently-encoded scan string into a structured
//! [`ParsedIdentifier`]. The input format is resolved once at entry into a
//! [`ScanFormat`] and the matching parser runs: the GS1 tokenizers for
//! bracketed and concatenated element strings, or one of the fallbacks for
//! URLs, JSON blobs, labeled scanner-app dumps and bare digit runs.
//!
//! Parsing is scanning untrusted, dirty, manufacturer-idiosyncratic data by
//! design, so this function never fails: on total failure it returns an
//! identifier with every field `None` and the format marked
//! [`ScanFormat::Unrecognized`]. Only configuration errors surface as
//! [`ParseError`].
//!
//! ```
//! use rx_ingest::{RawScanInput, ScanSource};
//! use rx_parse::{parse, ParseConfig};
//!
//! let scan = RawScanInput::new(
//!     "(01)00312345678906(17)220615(10)ABC123(21)XYZ987",
//!     ScanSource::Camera,
//! );
//! let parsed = parse(&scan, &ParseConfig::default());
//! assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
//! assert_eq!(parsed.lot_number.as_deref(), Some("ABC123"));
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, span, warn, Level};

use rx_gtin::{decompose, normalize_to_gtin14, validate};
use rx_ingest::RawScanInput;

mod fallback;
mod tokenizer;
mod types;

pub use types::{ApplicationIdentifierEntry, ParsedIdentifier, ScanFormat};

use types::RawFields;

/// Runtime configuration for scan parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Semantic version of the parse configuration.
    pub version: u32,
    /// Longest alphanumeric run the raw-digit fallback will take as a lot
    /// number before treating the remainder as a serial.
    #[serde(default = "ParseConfig::default_raw_lot_max_len")]
    pub raw_lot_max_len: usize,
}

impl ParseConfig {
    fn default_raw_lot_max_len() -> usize {
        20
    }

    /// Reject configurations the parser cannot honor.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.version == 0 {
            return Err(ParseError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.raw_lot_max_len == 0 {
            return Err(ParseError::InvalidConfig(
                "raw_lot_max_len must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            version: 1,
            raw_lot_max_len: Self::default_raw_lot_max_len(),
        }
    }
}

/// Errors from the parsing layer. Scan text never produces one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid parse config: {0}")]
    InvalidConfig(String),
}

/// Resolve which parser should handle a piece of scan text.
///
/// Decided once; the tagged result replaces ad-hoc probing of the payload
/// shape downstream.
pub fn detect_format(text: &str) -> ScanFormat {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ScanFormat::Unrecognized;
    }
    if trimmed.starts_with('(') {
        return ScanFormat::Gs1Bracketed;
    }
    if looks_concatenated(trimmed) {
        return ScanFormat::Gs1Concatenated;
    }
    if trimmed.contains("://") && fallback::parse_url_query(trimmed).is_some() {
        return ScanFormat::UrlQuery;
    }
    if trimmed.starts_with('{') && fallback::parse_json_blob(trimmed).is_some() {
        return ScanFormat::JsonBlob;
    }
    if fallback::has_labeled_markers(trimmed) {
        return ScanFormat::LabeledText;
    }
    if trimmed
        .get(..14)
        .is_some_and(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
    {
        return ScanFormat::RawDigits;
    }
    ScanFormat::Unrecognized
}

/// Whether text reads as a concatenated GS1 element string: it leads with
/// the GTIN AI and fourteen digits, or carries FNC1 group separators after
/// a known AI.
fn looks_concatenated(text: &str) -> bool {
    let leads_with_gtin = text.starts_with("01")
        && text
            .get(2..16)
            .is_some_and(|body| body.chars().all(|c| c.is_ascii_digit()));
    let separated = text.contains(tokenizer::GROUP_SEPARATOR)
        && matches!(text.get(0..2), Some("01" | "10" | "17" | "21" | "30"));
    leads_with_gtin || separated
}

/// Parse one captured scan into a structured identifier.
///
/// Pure and total over domain input: every call is independent, retains no
/// state, and never fails. Run the scanner-artifact corrector first when the
/// capture source warrants it.
pub fn parse(input: &RawScanInput, cfg: &ParseConfig) -> ParsedIdentifier {
    let start = Instant::now();
    let span = span!(Level::INFO, "rx_parse.parse", source = ?input.source);
    let _guard = span.enter();

    let text = input.text.trim();
    let format = detect_format(text);

    let (fields, entries) = match format {
        ScanFormat::Gs1Bracketed => tokenizer::tokenize_bracketed(text),
        ScanFormat::Gs1Concatenated => tokenizer::tokenize_concatenated(text),
        ScanFormat::UrlQuery => (
            fallback::parse_url_query(text).unwrap_or_default(),
            Vec::new(),
        ),
        ScanFormat::JsonBlob => (
            fallback::parse_json_blob(text).unwrap_or_default(),
            Vec::new(),
        ),
        ScanFormat::LabeledText => (
            fallback::parse_labeled_text(text, cfg.raw_lot_max_len),
            Vec::new(),
        ),
        ScanFormat::RawDigits => (
            fallback::parse_raw_digits(text, cfg.raw_lot_max_len),
            Vec::new(),
        ),
        ScanFormat::Unrecognized => (RawFields::default(), Vec::new()),
    };

    let parsed = finalize(input, format, fields, entries);
    info!(
        format = ?parsed.format,
        has_gtin = parsed.gtin.is_some(),
        has_lot = parsed.lot_number.is_some(),
        has_expiration = parsed.expiration_date.is_some(),
        has_serial = parsed.serial_number.is_some(),
        elapsed_micros = start.elapsed().as_micros(),
        "scan_parsed"
    );
    parsed
}

/// Normalize the decoded fields into the final identifier.
fn finalize(
    input: &RawScanInput,
    format: ScanFormat,
    fields: RawFields,
    entries: Vec<ApplicationIdentifierEntry>,
) -> ParsedIdentifier {
    let gtin = fields
        .gtin
        .as_deref()
        .map(normalize_to_gtin14)
        .filter(|g| g.len() == 14);

    if let Some(g) = gtin.as_deref() {
        if !validate(g) {
            // Recorded for the caller; an invalid check digit is a warning,
            // not a rejection.
            warn!(gtin = %g, "gtin check digit invalid");
        }
    }

    let gtin_parts = gtin.as_deref().map(decompose);
    let ndc = gtin.as_deref().and_then(extract_ndc);

    ParsedIdentifier {
        gtin,
        gtin_parts,
        lot_number: fields.lot,
        expiration_date: fields.expiration,
        serial_number: fields.serial,
        quantity: fields.quantity,
        ndc,
        entries,
        format,
        raw: input.clone(),
    }
}

/// NDC recovery for `003`-prefixed GTINs: nine digits at positions 3..12,
/// hyphenated 5-4.
fn extract_ndc(gtin14: &str) -> Option<String> {
    if gtin14.len() != 14 || !gtin14.starts_with("003") {
        return None;
    }
    Some(format!("{}-{}", &gtin14[3..8], &gtin14[8..12]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rx_ingest::ScanSource;

    fn scan(text: &str) -> RawScanInput {
        RawScanInput::new(text, ScanSource::Camera)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn bracketed_element_string_fully_decodes() {
        let parsed = parse(
            &scan("(01)00312345678906(17)220615(10)ABC123(21)XYZ987"),
            &ParseConfig::default(),
        );
        assert_eq!(parsed.format, ScanFormat::Gs1Bracketed);
        assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(parsed.expiration_date, Some(date(2022, 6, 15)));
        assert_eq!(parsed.lot_number.as_deref(), Some("ABC123"));
        assert_eq!(parsed.serial_number.as_deref(), Some("XYZ987"));
        assert_eq!(parsed.entries.len(), 4);
    }

    #[test]
    fn ndc_recovered_from_003_gtin() {
        let parsed = parse(&scan("(01)00312345678906"), &ParseConfig::default());
        assert_eq!(parsed.ndc.as_deref(), Some("12345-6789"));

        let other = parse(&scan("(01)10312345678903"), &ParseConfig::default());
        assert_eq!(other.ndc, None);
    }

    #[test]
    fn short_gtin_normalizes_to_fourteen_digits() {
        let parsed = parse(&scan("(01)312345678906"), &ParseConfig::default());
        assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
        let parts = parsed.gtin_parts.expect("parts decoded");
        assert_eq!(parts.company_prefix, "0312345");
    }

    #[test]
    fn url_query_scan() {
        let parsed = parse(
            &scan("https://rx.example.com/v?gtin=312345678906&lot=abc&exp=2022-06-15"),
            &ParseConfig::default(),
        );
        assert_eq!(parsed.format, ScanFormat::UrlQuery);
        assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(parsed.lot_number.as_deref(), Some("abc"));
        assert_eq!(parsed.expiration_date, Some(date(2022, 6, 15)));
    }

    #[test]
    fn json_blob_scan() {
        let parsed = parse(
            &scan(r#"{"gtin":"00312345678906","lotNumber":"L1"}"#),
            &ParseConfig::default(),
        );
        assert_eq!(parsed.format, ScanFormat::JsonBlob);
        assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(parsed.lot_number.as_deref(), Some("L1"));
    }

    #[test]
    fn labeled_dump_scan() {
        let parsed = parse(
            &scan("GTIN: 00312345678906\nExpiration Date: 09/30/26"),
            &ParseConfig::default(),
        );
        assert_eq!(parsed.format, ScanFormat::LabeledText);
        assert_eq!(parsed.expiration_date, Some(date(2026, 9, 30)));
    }

    #[test]
    fn raw_digit_scan() {
        let parsed = parse(
            &scan("00312345678906220615ABC123"),
            &ParseConfig::default(),
        );
        assert_eq!(parsed.format, ScanFormat::RawDigits);
        assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(parsed.expiration_date, Some(date(2022, 6, 15)));
        assert_eq!(parsed.lot_number.as_deref(), Some("ABC123"));
    }

    #[test]
    fn concatenated_scan_detected_over_raw_digits() {
        let parsed = parse(&scan("010031234567890617220615"), &ParseConfig::default());
        assert_eq!(parsed.format, ScanFormat::Gs1Concatenated);
        assert_eq!(parsed.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(parsed.expiration_date, Some(date(2022, 6, 15)));
    }

    #[test]
    fn unparseable_input_yields_empty_identifier() {
        for text in ["", "   ", "hello world", "(((", "{\"broken\":"] {
            let parsed = parse(&scan(text), &ParseConfig::default());
            assert!(parsed.is_empty(), "no field should decode from {text:?}");
            assert!(matches!(
                parsed.format,
                ScanFormat::Unrecognized | ScanFormat::Gs1Bracketed
            ));
        }
    }

    #[test]
    fn rapid_repeated_calls_share_no_state() {
        let cfg = ParseConfig::default();
        let first = parse(&scan("(01)00312345678906(10)LOT1"), &cfg);
        let _noise = parse(&scan("garbage in between"), &cfg);
        let second = parse(&scan("(01)00312345678906(10)LOT1"), &cfg);
        assert_eq!(first.gtin, second.gtin);
        assert_eq!(first.lot_number, second.lot_number);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = ParseConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ParseError::InvalidConfig(_))
        ));
        let cfg = ParseConfig {
            raw_lot_max_len: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sgtin_urn_in_json_does_not_masquerade_as_gtin() {
        // EPCIS records sometimes carry SGTIN URNs in the gtin slot. The
        // URN's digit content is not a 14-digit GTIN, so the field stays
        // empty here; dedicated URN handling lives in rx_gtin::Sgtin.
        let parsed = parse(
            &scan(r#"{"gtin":"urn:epc:id:sgtin:0312345.067890.XYZ987"}"#),
            &ParseConfig::default(),
        );
        assert!(parsed.gtin.is_none());
    }
}
