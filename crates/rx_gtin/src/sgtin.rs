//! SGTIN EPC URN handling.
//!
//! EPCIS shipment records frequently carry product identity as serialized
//! GTIN URNs (`urn:epc:id:sgtin:<companyPrefix>.<indicator+itemRef>.<serial>`)
//! or the pattern form (`urn:epc:idpat:sgtin:…`) whose serial is the `*`
//! wildcard. The digit content is the same as a GTIN-14 minus the check
//! digit, so both directions of the conversion are lossless.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{check_digit, normalize_to_gtin14, GtinLayout, GtinParts};

const ID_PREFIX: &str = "urn:epc:id:sgtin:";
const IDPAT_PREFIX: &str = "urn:epc:idpat:sgtin:";

/// Errors from parsing an SGTIN URN.
///
/// These surface only on the explicit [`Sgtin::parse`] entry point; the
/// fail-soft decomposition path swallows them into empty parts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SgtinError {
    #[error("not an sgtin urn: {0}")]
    WrongScheme(String),
    #[error("sgtin urn must have company-prefix, item-reference and serial segments")]
    MissingSegments,
    #[error("sgtin segments must be numeric: {0}")]
    NonNumericSegment(String),
}

/// A parsed serialized GTIN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sgtin {
    pub company_prefix: String,
    pub indicator_digit: char,
    pub item_reference: String,
    /// Unit serial; `*` in the `idpat` wildcard form.
    pub serial: String,
}

impl Sgtin {
    /// Parse either URN form. The serial segment is optional in practice;
    /// a missing serial parses as the wildcard.
    pub fn parse(urn: &str) -> Result<Self, SgtinError> {
        let trimmed = urn.trim();
        let body = trimmed
            .strip_prefix(ID_PREFIX)
            .or_else(|| trimmed.strip_prefix(IDPAT_PREFIX))
            .ok_or_else(|| SgtinError::WrongScheme(trimmed.to_string()))?;

        let mut segments = body.split('.');
        let company_prefix = segments.next().unwrap_or_default();
        let item_segment = segments.next().ok_or(SgtinError::MissingSegments)?;
        let serial = segments.next().unwrap_or("*");

        if company_prefix.is_empty() || item_segment.is_empty() {
            return Err(SgtinError::MissingSegments);
        }
        if !company_prefix.chars().all(|c| c.is_ascii_digit()) {
            return Err(SgtinError::NonNumericSegment(company_prefix.to_string()));
        }
        if !item_segment.chars().all(|c| c.is_ascii_digit()) {
            return Err(SgtinError::NonNumericSegment(item_segment.to_string()));
        }

        let mut item_chars = item_segment.chars();
        let indicator_digit = item_chars.next().ok_or(SgtinError::MissingSegments)?;
        Ok(Self {
            company_prefix: company_prefix.to_string(),
            indicator_digit,
            item_reference: item_chars.collect(),
            serial: serial.to_string(),
        })
    }

    /// Build an SGTIN from a GTIN digit string plus a serial number.
    ///
    /// Returns `None` when the input does not normalize to 14 digits.
    pub fn from_gtin(gtin: &str, serial: &str) -> Option<Self> {
        let digits = normalize_to_gtin14(gtin);
        if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            company_prefix: digits[1..8].to_string(),
            indicator_digit: digits.chars().next()?,
            item_reference: digits[8..13].to_string(),
            serial: if serial.is_empty() {
                "*".to_string()
            } else {
                serial.to_string()
            },
        })
    }

    /// The equivalent 14-digit GTIN, with the check digit recomputed.
    pub fn to_gtin14(&self) -> Option<String> {
        let mut body = String::with_capacity(13);
        body.push(self.indicator_digit);
        body.push_str(&self.company_prefix);
        body.push_str(&self.item_reference);
        if body.len() != 13 {
            return None;
        }
        let check = check_digit(&body)?;
        body.push(check);
        Some(body)
    }

    /// True for the `idpat` wildcard-serial form.
    pub fn is_wildcard(&self) -> bool {
        self.serial == "*"
    }

    /// Convert into structural GTIN parts (no check digit; SGTINs do not
    /// carry one).
    pub fn into_parts(self) -> GtinParts {
        GtinParts {
            company_prefix: self.company_prefix,
            indicator_digit: Some(self.indicator_digit),
            item_reference: self.item_reference,
            check_digit: None,
            layout: GtinLayout::Standard,
        }
    }

    /// Render the URN, using the `idpat` scheme for wildcard serials.
    pub fn to_urn(&self) -> String {
        let scheme = if self.is_wildcard() {
            IDPAT_PREFIX
        } else {
            ID_PREFIX
        };
        format!(
            "{scheme}{}.{}{}.{}",
            self.company_prefix, self.indicator_digit, self.item_reference, self.serial
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_form() {
        let sgtin = Sgtin::parse("urn:epc:id:sgtin:0312345.067890.XYZ987").expect("valid urn");
        assert_eq!(sgtin.company_prefix, "0312345");
        assert_eq!(sgtin.indicator_digit, '0');
        assert_eq!(sgtin.item_reference, "67890");
        assert_eq!(sgtin.serial, "XYZ987");
        assert!(!sgtin.is_wildcard());
    }

    #[test]
    fn parse_idpat_wildcard_form() {
        let sgtin = Sgtin::parse("urn:epc:idpat:sgtin:0312345.067890.*").expect("valid urn");
        assert!(sgtin.is_wildcard());
        assert_eq!(sgtin.to_urn(), "urn:epc:idpat:sgtin:0312345.067890.*");
    }

    #[test]
    fn missing_serial_parses_as_wildcard() {
        let sgtin = Sgtin::parse("urn:epc:id:sgtin:0312345.067890").expect("valid urn");
        assert!(sgtin.is_wildcard());
    }

    #[test]
    fn gtin_round_trip() {
        let sgtin = Sgtin::parse("urn:epc:id:sgtin:0312345.067890.SER1").expect("valid urn");
        // Digit content 0 0312345 67890 plus the recomputed check digit.
        assert_eq!(sgtin.to_gtin14().as_deref(), Some("00312345678906"));

        let back = Sgtin::from_gtin("00312345678906", "SER1").expect("valid gtin");
        assert_eq!(back, sgtin);
        assert_eq!(back.to_urn(), "urn:epc:id:sgtin:0312345.067890.SER1");
    }

    #[test]
    fn rejects_malformed_urns() {
        assert!(matches!(
            Sgtin::parse("urn:epc:id:sscc:0312345.067890"),
            Err(SgtinError::WrongScheme(_))
        ));
        assert!(matches!(
            Sgtin::parse("urn:epc:id:sgtin:0312345"),
            Err(SgtinError::MissingSegments)
        ));
        assert!(matches!(
            Sgtin::parse("urn:epc:id:sgtin:03123AB.067890.S"),
            Err(SgtinError::NonNumericSegment(_))
        ));
    }

    #[test]
    fn odd_length_content_has_no_gtin14() {
        let sgtin = Sgtin::parse("urn:epc:id:sgtin:031234.067890.S").expect("valid urn");
        assert_eq!(sgtin.to_gtin14(), None);
    }
}
