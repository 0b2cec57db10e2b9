//! Value types for the reconciliation layer.

use chrono::NaiveDate;
use rx_gtin::{decompose, normalize_to_gtin14, Sgtin};
use rx_ingest::{RawScanInput, ScanSource};
use rx_parse::{ParsedIdentifier, ScanFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of comparing a scanned identifier against one on file.
/// Produced fresh per comparison; never stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchVerdict {
    /// Normalized GTIN strings are identical.
    pub exact: bool,
    /// Same company prefix + item reference, packaging level aside.
    pub same_base_product: bool,
    /// Company prefixes agree.
    pub same_company: bool,
    /// 0-100 confidence in the two identifiers naming the same product.
    pub confidence: u8,
}

impl MatchVerdict {
    /// The zero verdict: unrelated identifiers.
    pub fn no_match() -> Self {
        Self::default()
    }
}

/// Which tier of the decision ladder produced a verdict. Reported to the
/// metrics hook and traces; not part of the verdict itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerdictTier {
    Exact,
    BaseProduct,
    Reordered,
    Similar,
    NoMatch,
}

/// Per-request configuration for the comparison engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Semantic version of the match configuration.
    pub version: u32,
    /// Positional digit-similarity ratio above which differing item
    /// references still count as the same product.
    #[serde(default = "MatchConfig::default_similarity_threshold")]
    pub similarity_threshold: f32,
}

impl MatchConfig {
    pub(crate) fn default_similarity_threshold() -> f32 {
        0.8
    }

    /// Validate the configuration for a single request.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.version == 0 {
            return Err(MatchError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(MatchError::InvalidConfig(
                "similarity_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: 1,
            similarity_threshold: Self::default_similarity_threshold(),
        }
    }
}

/// Errors produced by the matching layer. Comparing dirty identifiers never
/// errors; only configuration can.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Invalid configuration (per-request or global).
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}

/// Product-identity fields of a stored EPCIS shipment record.
///
/// The persistence layer that produces these is an external collaborator;
/// this is only the adapter into the comparison engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpcisShipmentFields {
    /// GTIN as stored: any digit width, or an SGTIN URN.
    pub gtin: String,
    pub lot_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub serial_number: Option<String>,
}

impl EpcisShipmentFields {
    /// Adapt the stored fields into a [`ParsedIdentifier`] so the scoring
    /// engine can treat both sides uniformly. SGTIN URNs convert to their
    /// canonical 14-digit form, check digit recomputed.
    pub fn to_identifier(&self) -> ParsedIdentifier {
        let trimmed = self.gtin.trim();
        let gtin = if trimmed.starts_with("urn:epc:") {
            Sgtin::parse(trimmed).ok().and_then(|s| s.to_gtin14())
        } else {
            let normalized = normalize_to_gtin14(trimmed);
            (normalized.len() == 14).then_some(normalized)
        };
        let gtin_parts = match gtin.as_deref() {
            Some(g) => Some(decompose(g)),
            None => {
                let parts = decompose(trimmed);
                (!parts.is_empty()).then_some(parts)
            }
        };
        ParsedIdentifier {
            gtin,
            gtin_parts,
            lot_number: self.lot_number.clone(),
            expiration_date: self.expiration_date,
            serial_number: self.serial_number.clone(),
            quantity: None,
            ndc: None,
            entries: Vec::new(),
            format: ScanFormat::RawDigits,
            raw: RawScanInput::new(self.gtin.clone(), ScanSource::Manual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = MatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.similarity_threshold - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let cfg = MatchConfig {
            similarity_threshold: 1.5,
            ..MatchConfig::default()
        };
        let err = cfg.validate().expect_err("config should be invalid");
        match err {
            MatchError::InvalidConfig(msg) => assert!(msg.contains("similarity_threshold")),
        }
    }

    #[test]
    fn zero_version_rejected() {
        let cfg = MatchConfig {
            version: 0,
            ..MatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn epcis_adapter_normalizes_digit_gtin() {
        let record = EpcisShipmentFields {
            gtin: "312345678906".into(),
            lot_number: Some("ABC123".into()),
            expiration_date: None,
            serial_number: None,
        };
        let id = record.to_identifier();
        assert_eq!(id.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(id.lot_number.as_deref(), Some("ABC123"));
        let parts = id.gtin_parts.expect("decomposed");
        assert_eq!(parts.company_prefix, "0312345");
    }

    #[test]
    fn epcis_adapter_handles_sgtin_urn() {
        let record = EpcisShipmentFields {
            gtin: "urn:epc:id:sgtin:0312345.067890.SER9".into(),
            lot_number: None,
            expiration_date: None,
            serial_number: Some("SER9".into()),
        };
        let id = record.to_identifier();
        // The URN's digit content converts losslessly, check digit
        // recomputed, so cross-format comparison sees plain GTINs.
        assert_eq!(id.gtin.as_deref(), Some("00312345678906"));
        let parts = id.gtin_parts.expect("decomposed");
        assert_eq!(parts.company_prefix, "0312345");
        assert_eq!(parts.item_reference, "67890");
    }
}
