//! Packaging-level conversion between item ("each") and case GTINs.
//!
//! The default conversion rewrites only the indicator digit. Manufacturers
//! with a registered rule may additionally rewrite the item-reference digits
//! and use non-default indicators. Either way the check digit is recomputed,
//! so the output is always a valid GTIN-14 when the input was.

use tracing::debug;

use crate::manufacturer::rule_for;
use crate::{check_digit, decompose_with_layout, normalize_to_gtin14, GtinLayout, GtinParts};

const DEFAULT_CASE_INDICATOR: char = '5';
const DEFAULT_ITEM_INDICATOR: char = '0';

/// Convert a GTIN to its case-level representation.
///
/// Input is normalized to 14 digits first. Unusable input (fewer than 14
/// digits after stripping) is returned normalized but otherwise unchanged.
pub fn to_case_level(gtin: &str) -> String {
    transform(gtin, Direction::Case)
}

/// Convert a GTIN to its item-level ("each") representation.
///
/// Inverse of [`to_case_level`] for every registered manufacturer rule:
/// the round trip preserves the base-product key.
pub fn to_item_level(gtin: &str) -> String {
    transform(gtin, Direction::Item)
}

/// Whether a GTIN encodes a case-level (or higher) packaging unit.
///
/// Indicator `1`-`8` is case level, `0` is an each. Indicator `9` means
/// variable quantity in general and counts as case only for manufacturers
/// whose registered rule says so; callers needing a different policy for
/// `9` should inspect the indicator digit themselves.
pub fn is_case_level(gtin: &str) -> bool {
    let digits = normalize_to_gtin14(gtin);
    let rule = rule_for(&digits);
    let layout = match rule {
        Some(r) if r.prefix_first_layout => GtinLayout::PrefixFirst,
        _ => GtinLayout::Standard,
    };
    let parts = decompose_with_layout(&digits, layout);
    match parts.indicator_digit {
        Some('1'..='8') => true,
        Some('9') => rule.is_some_and(|r| r.variable_quantity_as_case),
        _ => false,
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Case,
    Item,
}

fn transform(gtin: &str, direction: Direction) -> String {
    let digits = normalize_to_gtin14(gtin);
    if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return digits;
    }

    let rule = rule_for(&digits);
    let layout = match rule {
        Some(r) if r.prefix_first_layout => GtinLayout::PrefixFirst,
        _ => GtinLayout::Standard,
    };
    let parts = decompose_with_layout(&digits, layout);

    let (indicator, item_reference) = match (rule, direction) {
        (Some(r), Direction::Case) => {
            debug!(rule = r.name, gtin = %digits, "manufacturer case transform");
            let reference = match r.reference_rewrite {
                Some(rewrite) => rewrite.to_case(&parts.item_reference),
                None => parts.item_reference.clone(),
            };
            (r.case_indicator, reference)
        }
        (Some(r), Direction::Item) => {
            debug!(rule = r.name, gtin = %digits, "manufacturer item transform");
            let reference = match r.reference_rewrite {
                Some(rewrite) => rewrite.to_item(&parts.item_reference),
                None => parts.item_reference.clone(),
            };
            (r.item_indicator, reference)
        }
        (None, Direction::Case) => (DEFAULT_CASE_INDICATOR, parts.item_reference.clone()),
        (None, Direction::Item) => (DEFAULT_ITEM_INDICATOR, parts.item_reference.clone()),
    };

    rebuild(&parts, indicator, &item_reference).unwrap_or(digits)
}

/// Reassemble a 14-digit GTIN from parts with a fresh check digit.
fn rebuild(parts: &GtinParts, indicator: char, item_reference: &str) -> Option<String> {
    let mut body = String::with_capacity(13);
    match parts.layout {
        GtinLayout::Standard => {
            body.push(indicator);
            body.push_str(&parts.company_prefix);
        }
        GtinLayout::PrefixFirst => {
            body.push_str(&parts.company_prefix);
            body.push(indicator);
        }
    }
    body.push_str(item_reference);
    let check = check_digit(&body)?;
    body.push(check);
    Some(body)
}
