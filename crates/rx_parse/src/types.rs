//! Value types produced by the parsing pipeline.

use chrono::NaiveDate;
use rx_gtin::GtinParts;
use rx_ingest::RawScanInput;
use serde::{Deserialize, Serialize};

/// The input format a scan resolved to, decided once at parse entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanFormat {
    /// `(AI)value(AI)value…` element string.
    Gs1Bracketed,
    /// Concatenated element string without brackets, with FNC1 group
    /// separators or scanner artifacts at field boundaries.
    Gs1Concatenated,
    /// URL carrying `gtin`/`lot`/`exp`/`serial` query parameters.
    UrlQuery,
    /// JSON object with `gtin`/`lotNumber`/`expirationDate`/`serialNumber`
    /// keys.
    JsonBlob,
    /// Scanner-app diagnostic dump with labeled lines.
    LabeledText,
    /// Bare digit run decomposed positionally.
    RawDigits,
    /// Nothing recognizable; every field stays empty.
    Unrecognized,
}

/// One `(application identifier, raw value)` pair in scan order.
///
/// Ordering matters only for display; matching uses the decoded field set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationIdentifierEntry {
    pub code: String,
    pub value: String,
}

/// A fully decoded scan or on-file record.
///
/// Constructed once by the parsing pipeline and immutable thereafter.
/// Fields the input did not carry remain `None`; nothing is fabricated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedIdentifier {
    /// Canonical 14-digit GTIN, when one was found.
    pub gtin: Option<String>,
    /// Structural split of the GTIN, registry-aware.
    pub gtin_parts: Option<GtinParts>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub serial_number: Option<String>,
    pub quantity: Option<u32>,
    /// NDC recovered from `003`-prefixed GTINs, rendered `5-4` hyphenated.
    pub ndc: Option<String>,
    /// Tokenized AI entries in scan order (GS1 formats only).
    pub entries: Vec<ApplicationIdentifierEntry>,
    pub format: ScanFormat,
    pub raw: RawScanInput,
}

impl ParsedIdentifier {
    /// The fail-soft result: every field empty, format [`ScanFormat::Unrecognized`].
    pub fn unparsed(raw: RawScanInput) -> Self {
        Self {
            gtin: None,
            gtin_parts: None,
            lot_number: None,
            expiration_date: None,
            serial_number: None,
            quantity: None,
            ndc: None,
            entries: Vec::new(),
            format: ScanFormat::Unrecognized,
            raw,
        }
    }

    /// True when no field at all was decoded.
    pub fn is_empty(&self) -> bool {
        self.gtin.is_none()
            && self.lot_number.is_none()
            && self.expiration_date.is_none()
            && self.serial_number.is_none()
            && self.quantity.is_none()
    }
}

/// Decoded fields accumulated by the individual parsers before
/// finalization. First assignment wins, matching how the concatenated
/// tokenizer treats repeated AIs.
#[derive(Debug, Default, Clone)]
pub(crate) struct RawFields {
    pub gtin: Option<String>,
    pub lot: Option<String>,
    pub expiration: Option<NaiveDate>,
    pub serial: Option<String>,
    pub quantity: Option<u32>,
}

impl RawFields {
    pub fn set_gtin(&mut self, value: impl Into<String>) {
        if self.gtin.is_none() {
            let value = value.into();
            if !value.is_empty() {
                self.gtin = Some(value);
            }
        }
    }

    pub fn set_lot(&mut self, value: impl Into<String>) {
        if self.lot.is_none() {
            let value = value.into();
            if !value.is_empty() {
                self.lot = Some(value);
            }
        }
    }

    pub fn set_expiration(&mut self, value: Option<NaiveDate>) {
        if self.expiration.is_none() {
            self.expiration = value;
        }
    }

    pub fn set_serial(&mut self, value: impl Into<String>) {
        if self.serial.is_none() {
            let value = value.into();
            if !value.is_empty() {
                self.serial = Some(value);
            }
        }
    }

    pub fn set_quantity(&mut self, value: Option<u32>) {
        if self.quantity.is_none() {
            self.quantity = value;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gtin.is_none()
            && self.lot.is_none()
            && self.expiration.is_none()
            && self.serial.is_none()
            && self.quantity.is_none()
    }
}
