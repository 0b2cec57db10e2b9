//! # GTIN normalization and validation
//!
//! This crate turns the digit strings found in pharmaceutical barcodes into a
//! canonical 14-digit GTIN representation and splits them into their
//! structural parts. It is deliberately forgiving: barcode payloads are
//! dirty, manufacturer-idiosyncratic data, so malformed input degrades to
//! empty [`GtinParts`] rather than an error, leaving downstream matching free
//! to attempt company-prefix-level comparison.
//!
//! ## Core Responsibilities
//!
//! - **Check digits**: the GS1 mod-10 weighted algorithm ([`check_digit`],
//!   [`validate`]).
//! - **Normalization**: any GTIN-8/12/13/14 digit string left-pads to 14
//!   digits ([`normalize_to_gtin14`]); the operation is idempotent.
//! - **Decomposition**: a 14-digit GTIN splits into company prefix,
//!   indicator digit, item reference and check digit ([`decompose`]). Two
//!   layouts exist in the wild (see [`GtinLayout`]); the standard layout is
//!   the default and the legacy prefix-first split applies only to
//!   manufacturer-prefix-matched data.
//! - **SGTIN URNs**: `urn:epc:id:sgtin:…` and the `idpat` wildcard form
//!   interconvert with the digit representation (see [`Sgtin`]).
//! - **Packaging levels**: item ↔ case conversion driven by the
//!   manufacturer rule registry (see [`to_case_level`], [`to_item_level`]).

use serde::{Deserialize, Serialize};

mod manufacturer;
mod packaging;
mod sgtin;

pub use manufacturer::{registry, rule_for, ManufacturerRule, ReferenceRewrite};
pub use packaging::{is_case_level, to_case_level, to_item_level};
pub use sgtin::{Sgtin, SgtinError};

/// Positional layout of a 14-digit GTIN.
///
/// The standard GS1 layout places the indicator digit first, then the
/// company prefix and item reference. A legacy split observed in some
/// manufacturer data places the 7-digit company prefix first and the
/// indicator digit after it. Both decompose to the same field set but give
/// different results on the same digit string, so the layout is carried
/// explicitly instead of being silently generalized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GtinLayout {
    /// indicator(1) + companyPrefix(7) + itemReference(5) + check(1).
    #[default]
    Standard,
    /// companyPrefix(7) + indicator(1) + itemReference(5) + check(1).
    PrefixFirst,
}

/// Structural parts of a GTIN-14.
///
/// Concatenating the fields in layout order reconstructs the original
/// 14-digit string. Malformed input produces empty strings and `None`
/// digits, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GtinParts {
    /// GS1 company prefix (7 digits for the pharma GTINs handled here).
    pub company_prefix: String,
    /// Packaging-level indicator: `0` each, `1`-`8` ascending case levels,
    /// `9` variable quantity.
    pub indicator_digit: Option<char>,
    /// Item reference (5 digits).
    pub item_reference: String,
    /// Mod-10 check digit, when the encoding carries one (SGTIN URNs do not).
    pub check_digit: Option<char>,
    /// Which positional split produced these parts.
    pub layout: GtinLayout,
}

impl GtinParts {
    /// Parts with every field empty, the fail-soft result for unusable input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no field was recovered.
    pub fn is_empty(&self) -> bool {
        self.company_prefix.is_empty() && self.item_reference.is_empty()
    }

    /// Reconstruct the 14-digit GTIN in layout order.
    ///
    /// Returns `None` when the parts are incomplete (empty fields or a
    /// missing check digit).
    pub fn gtin14(&self) -> Option<String> {
        let indicator = self.indicator_digit?;
        let check = self.check_digit?;
        if self.company_prefix.is_empty() || self.item_reference.is_empty() {
            return None;
        }
        let mut out = String::with_capacity(14);
        match self.layout {
            GtinLayout::Standard => {
                out.push(indicator);
                out.push_str(&self.company_prefix);
            }
            GtinLayout::PrefixFirst => {
                out.push_str(&self.company_prefix);
                out.push(indicator);
            }
        }
        out.push_str(&self.item_reference);
        out.push(check);
        Some(out)
    }

    /// The base-product identity: company prefix + item reference, ignoring
    /// indicator and check digit. `None` when either field is empty.
    pub fn base_product_key(&self) -> Option<String> {
        if self.company_prefix.is_empty() || self.item_reference.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.company_prefix, self.item_reference))
    }
}

/// Drop every non-digit character.
pub fn strip_non_digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Compute the GS1 mod-10 check digit over a digit string that excludes the
/// check digit itself.
///
/// Scanning right to left, alternating digits are weighted 3 and 1 starting
/// with 3 on the rightmost input digit; the check digit is
/// `(10 - (sum mod 10)) mod 10`. Returns `None` when the input is empty or
/// contains a non-digit.
pub fn check_digit(digits: &str) -> Option<char> {
    if digits.is_empty() {
        return None;
    }
    let mut sum: u32 = 0;
    for (i, ch) in digits.chars().rev().enumerate() {
        let d = ch.to_digit(10)?;
        let weight = if i % 2 == 0 { 3 } else { 1 };
        sum += d * weight;
    }
    let check = (10 - (sum % 10)) % 10;
    char::from_digit(check, 10)
}

/// Validate the trailing check digit of a GTIN.
///
/// Non-digits are stripped first; the last remaining digit is treated as the
/// provided check digit and recomputed over the rest. Returns `false` rather
/// than raising for malformed input; callers decide whether to reject or
/// warn.
pub fn validate(gtin: &str) -> bool {
    let digits = strip_non_digits(gtin);
    if digits.len() < 2 {
        return false;
    }
    let (body, provided) = digits.split_at(digits.len() - 1);
    match check_digit(body) {
        Some(expected) => provided.chars().next() == Some(expected),
        None => false,
    }
}

/// Normalize any GTIN digit string to the canonical 14-digit form.
///
/// Non-digits are stripped and the result is left-padded with `0` to 14
/// digits. Idempotent: normalizing an already-normalized value is a no-op.
/// Strings longer than 14 digits pass through stripped but unpadded.
pub fn normalize_to_gtin14(gtin: &str) -> String {
    let digits = strip_non_digits(gtin);
    // Nothing to pad: an input with no digits at all stays empty so
    // downstream decomposition can treat it as malformed.
    if digits.is_empty() || digits.len() >= 14 {
        return digits;
    }
    let mut out = String::with_capacity(14);
    for _ in digits.len()..14 {
        out.push('0');
    }
    out.push_str(&digits);
    out
}

/// Split a GTIN (digit string or SGTIN URN) into its structural parts.
///
/// Digit strings are normalized to 14 digits first. The standard layout is
/// the default; the legacy prefix-first split applies only when the
/// manufacturer registry matches the digit string. SGTIN URNs route through
/// [`Sgtin::parse`]; a URN that fails to parse degrades to empty parts.
pub fn decompose(gtin: &str) -> GtinParts {
    let trimmed = gtin.trim();
    if trimmed.starts_with("urn:epc:") {
        return match Sgtin::parse(trimmed) {
            Ok(sgtin) => sgtin.into_parts(),
            Err(_) => GtinParts::empty(),
        };
    }
    let digits = normalize_to_gtin14(trimmed);
    if digits.len() != 14 {
        return GtinParts::empty();
    }
    let layout = match rule_for(&digits) {
        Some(rule) if rule.prefix_first_layout => GtinLayout::PrefixFirst,
        _ => GtinLayout::Standard,
    };
    decompose_with_layout(&digits, layout)
}

/// Split a normalized 14-digit GTIN under an explicit layout.
///
/// Returns empty parts when the input is not exactly 14 digits.
pub fn decompose_with_layout(digits: &str, layout: GtinLayout) -> GtinParts {
    if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return GtinParts::empty();
    }
    let (company_prefix, indicator_digit) = match layout {
        GtinLayout::Standard => (digits[1..8].to_string(), digits.chars().next()),
        GtinLayout::PrefixFirst => (digits[0..7].to_string(), digits[7..8].chars().next()),
    };
    GtinParts {
        company_prefix,
        indicator_digit,
        item_reference: digits[8..13].to_string(),
        check_digit: digits[13..14].chars().next(),
        layout,
    }
}
