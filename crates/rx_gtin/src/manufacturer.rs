//! Manufacturer-specific encoding rules.
//!
//! A handful of manufacturers encode case-level GTINs with conventions that
//! plain indicator-digit rewriting cannot express. Those conventions live
//! here as a single lookup table so the packaging transform and the matcher
//! consult one source of truth instead of scattering prefix checks through
//! the code. Each entry is keyed by a fragment matched against the GTIN's
//! company-prefix region, mirroring how the scanned data actually carries
//! these prefixes.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A named, bidirectional rewrite of the item-reference digits.
///
/// Every variant must be self-inverse across the case/item pair:
/// `to_item(to_case(r)) == r` for all digit strings `r`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceRewrite {
    /// Case reference moves the leading digit of the item reference to the
    /// end; converting back moves the trailing digit to the front.
    RotateLeading,
}

impl ReferenceRewrite {
    /// Rewrite an item-level reference to its case-level form.
    pub fn to_case(self, item_reference: &str) -> String {
        match self {
            Self::RotateLeading => {
                let mut chars = item_reference.chars();
                match chars.next() {
                    Some(first) => {
                        let mut out: String = chars.collect();
                        out.push(first);
                        out
                    }
                    None => String::new(),
                }
            }
        }
    }

    /// Rewrite a case-level reference back to its item-level form.
    pub fn to_item(self, case_reference: &str) -> String {
        match self {
            Self::RotateLeading => {
                let mut chars = case_reference.chars();
                match chars.next_back() {
                    Some(last) => {
                        let mut out = String::with_capacity(case_reference.len());
                        out.push(last);
                        out.extend(chars);
                        out
                    }
                    None => String::new(),
                }
            }
        }
    }

    /// True when `a` and `b` are the case/item forms of the same reference,
    /// in either direction.
    pub fn equivalent(self, a: &str, b: &str) -> bool {
        self.to_case(a) == b || self.to_item(a) == b
    }
}

/// One manufacturer's packaging-encoding convention, matched by a
/// company-prefix fragment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManufacturerRule {
    /// Stable rule name, used in traces and tests.
    pub name: &'static str,
    /// Fragment matched as a substring of the GTIN's company-prefix region.
    pub prefix_fragment: &'static str,
    /// Indicator digit this manufacturer uses at case level.
    pub case_indicator: char,
    /// Indicator digit this manufacturer uses at item level.
    pub item_indicator: char,
    /// Optional item-reference rewrite applied alongside the indicator swap.
    pub reference_rewrite: Option<ReferenceRewrite>,
    /// Whether indicator `9` counts as case level for this manufacturer
    /// (elsewhere `9` means variable quantity).
    pub variable_quantity_as_case: bool,
    /// Whether this manufacturer's data uses the legacy prefix-first GTIN
    /// split instead of the standard layout.
    pub prefix_first_layout: bool,
}

static REGISTRY: Lazy<Vec<ManufacturerRule>> = Lazy::new(|| {
    vec![
        // Family that encodes cases with indicator 9 and a rotated item
        // reference, on the legacy prefix-first digit split.
        ManufacturerRule {
            name: "rotating_case_reference",
            prefix_fragment: "0363391",
            case_indicator: '9',
            item_indicator: '0',
            reference_rewrite: Some(ReferenceRewrite::RotateLeading),
            variable_quantity_as_case: true,
            prefix_first_layout: true,
        },
        // Family that uses indicator 4 for cases but is otherwise standard.
        ManufacturerRule {
            name: "case_indicator_four",
            prefix_fragment: "0310309",
            case_indicator: '4',
            item_indicator: '0',
            reference_rewrite: None,
            variable_quantity_as_case: false,
            prefix_first_layout: false,
        },
    ]
});

/// The process-wide manufacturer rule table, loaded once.
pub fn registry() -> &'static [ManufacturerRule] {
    REGISTRY.as_slice()
}

/// Find the rule whose prefix fragment occurs in the company-prefix region
/// of a 14-digit GTIN.
///
/// The region is taken under each rule's own layout (digits 0..7 for the
/// prefix-first split, 1..8 for the standard layout), so packaging
/// transforms, which never touch the company prefix, cannot change which
/// rule applies.
pub fn rule_for(digits: &str) -> Option<&'static ManufacturerRule> {
    if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    registry().iter().find(|rule| {
        let region = if rule.prefix_first_layout {
            &digits[0..7]
        } else {
            &digits[1..8]
        };
        region.contains(rule.prefix_fragment)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_leading_round_trips() {
        let rewrite = ReferenceRewrite::RotateLeading;
        assert_eq!(rewrite.to_case("12345"), "23451");
        assert_eq!(rewrite.to_item("23451"), "12345");
        assert_eq!(rewrite.to_item(&rewrite.to_case("90817")), "90817");
        assert_eq!(rewrite.to_case(""), "");
        assert_eq!(rewrite.to_item(""), "");
    }

    #[test]
    fn equivalent_matches_either_direction() {
        let rewrite = ReferenceRewrite::RotateLeading;
        assert!(rewrite.equivalent("12345", "23451"));
        assert!(rewrite.equivalent("23451", "12345"));
        assert!(!rewrite.equivalent("12345", "54321"));
    }

    #[test]
    fn rule_lookup_by_fragment() {
        let rule = rule_for("03633919234517").expect("fragment registered");
        assert_eq!(rule.name, "rotating_case_reference");
        assert!(rule_for("00312345678906").is_none());
    }

    #[test]
    fn every_rewrite_is_self_inverse() {
        for rule in registry() {
            if let Some(rewrite) = rule.reference_rewrite {
                for reference in ["12345", "00001", "98765"] {
                    assert_eq!(
                        rewrite.to_item(&rewrite.to_case(reference)),
                        reference,
                        "rule {} rewrite must invert cleanly",
                        rule.name
                    );
                }
            }
        }
    }
}
