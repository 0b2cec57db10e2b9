//! The reconciliation engine.
//!
//! Two entry points with deliberately different strictness:
//!
//! - [`compare`] ranks and explains how closely two identifiers relate,
//!   walking a five-tier decision ladder from exact equality down to
//!   positional digit similarity. Used to score candidate matches across a
//!   catalog.
//! - [`matches_record`] is the acceptance gate for a scan against one
//!   specific expected record: exact GTIN equality AND case-insensitive lot
//!   equality, nothing less. Expiration and serial agreement are recorded
//!   but never gate.
//!
//! The asymmetry is load-bearing: a fuzzy tier must never accept a scan the
//! gate would reject.

use std::time::Instant;

use tracing::{debug, span, Level};

use rx_gtin::{rule_for, GtinParts};
use rx_parse::ParsedIdentifier;

use crate::metrics::metrics_recorder;
use crate::types::{EpcisShipmentFields, MatchConfig, MatchVerdict, VerdictTier};

/// Score how closely a scanned identifier matches one on file, with the
/// default configuration.
pub fn compare(scanned: &ParsedIdentifier, on_file: &ParsedIdentifier) -> MatchVerdict {
    compare_with_config(scanned, on_file, &MatchConfig::default())
}

/// Score how closely a scanned identifier matches one on file.
///
/// Decision order: identical normalized GTINs (confidence 100); same
/// base-product key ignoring indicator and check digits (90); same company
/// with anagram or registered-rewrite item references (85); same company
/// with positionally similar references (50-90, scaled by the similarity
/// ratio); otherwise no match (0). Missing or empty GTIN fields on either
/// side yield the zero verdict rather than an error.
pub fn compare_with_config(
    scanned: &ParsedIdentifier,
    on_file: &ParsedIdentifier,
    cfg: &MatchConfig,
) -> MatchVerdict {
    let start = Instant::now();
    let span = span!(Level::DEBUG, "rx_match.compare");
    let _guard = span.enter();

    let (verdict, tier) = decide(scanned, on_file, cfg);
    debug!(
        tier = ?tier,
        confidence = verdict.confidence,
        exact = verdict.exact,
        same_base_product = verdict.same_base_product,
        "compare_verdict"
    );
    if let Some(recorder) = metrics_recorder() {
        recorder.record_compare(tier, verdict.confidence, start.elapsed());
    }
    verdict
}

fn decide(
    scanned: &ParsedIdentifier,
    on_file: &ParsedIdentifier,
    cfg: &MatchConfig,
) -> (MatchVerdict, VerdictTier) {
    let (Some(scanned_gtin), Some(on_file_gtin)) =
        (scanned.gtin.as_deref(), on_file.gtin.as_deref())
    else {
        return (MatchVerdict::no_match(), VerdictTier::NoMatch);
    };

    // Tier 1: exact normalized equality.
    if scanned_gtin == on_file_gtin {
        return (
            MatchVerdict {
                exact: true,
                same_base_product: true,
                same_company: true,
                confidence: 100,
            },
            VerdictTier::Exact,
        );
    }

    let scanned_parts = parts_of(scanned, scanned_gtin);
    let on_file_parts = parts_of(on_file, on_file_gtin);

    // Tier 2: same base product, packaging level aside.
    if let (Some(a), Some(b)) = (
        scanned_parts.base_product_key(),
        on_file_parts.base_product_key(),
    ) {
        if a == b {
            return (
                MatchVerdict {
                    exact: false,
                    same_base_product: true,
                    same_company: true,
                    confidence: 90,
                },
                VerdictTier::BaseProduct,
            );
        }
    }

    if scanned_parts.company_prefix.is_empty()
        || scanned_parts.company_prefix != on_file_parts.company_prefix
    {
        return (MatchVerdict::no_match(), VerdictTier::NoMatch);
    }

    // Tier 3: same company, item references reordered, either as plain
    // anagrams or as a registered manufacturer rewrite between packaging
    // levels.
    if references_reordered(&scanned_parts, &on_file_parts, scanned_gtin, on_file_gtin) {
        return (
            MatchVerdict {
                exact: false,
                same_base_product: true,
                same_company: true,
                confidence: 85,
            },
            VerdictTier::Reordered,
        );
    }

    // Tier 4: same company, similar references.
    let ratio = similarity_ratio(&scanned_parts.item_reference, &on_file_parts.item_reference);
    let confidence = (50.0 + ratio * 40.0).round() as u8;
    (
        MatchVerdict {
            exact: false,
            same_base_product: ratio > cfg.similarity_threshold,
            same_company: true,
            confidence,
        },
        VerdictTier::Similar,
    )
}

/// Use the identifier's decomposed parts when the parser supplied them;
/// otherwise decompose on the spot.
fn parts_of(identifier: &ParsedIdentifier, gtin: &str) -> GtinParts {
    identifier
        .gtin_parts
        .clone()
        .unwrap_or_else(|| rx_gtin::decompose(gtin))
}

fn references_reordered(
    scanned: &GtinParts,
    on_file: &GtinParts,
    scanned_gtin: &str,
    on_file_gtin: &str,
) -> bool {
    let a = &scanned.item_reference;
    let b = &on_file.item_reference;
    if a.is_empty() || b.is_empty() || a == b {
        return false;
    }
    if is_anagram(a, b) {
        return true;
    }
    // A registered packaging rewrite between item and case forms also
    // counts as the same base product.
    [scanned_gtin, on_file_gtin].into_iter().any(|gtin| {
        rule_for(gtin)
            .and_then(|rule| rule.reference_rewrite)
            .is_some_and(|rewrite| rewrite.equivalent(a, b))
    })
}

fn is_anagram(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts = [0i32; 10];
    for c in a.chars() {
        if let Some(d) = c.to_digit(10) {
            counts[d as usize] += 1;
        }
    }
    for c in b.chars() {
        if let Some(d) = c.to_digit(10) {
            counts[d as usize] -= 1;
        }
    }
    counts.iter().all(|&n| n == 0)
}

/// Positional digit-similarity over the shorter reference length.
fn similarity_ratio(a: &str, b: &str) -> f32 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let matching = a
        .chars()
        .zip(b.chars())
        .filter(|(x, y)| x == y)
        .count();
    matching as f32 / len as f32
}

/// The on-scan acceptance gate: does a parsed scan match one specific
/// expected shipment record?
///
/// Requires both exact normalized-GTIN equality and case-insensitive
/// lot-number equality. Expiration-date and serial-number agreement are
/// computed and recorded for diagnostics but do not affect the verdict.
pub fn matches_record(scanned: &ParsedIdentifier, on_file: &EpcisShipmentFields) -> bool {
    let start = Instant::now();
    let span = span!(Level::DEBUG, "rx_match.matches_record");
    let _guard = span.enter();

    let expected = on_file.to_identifier();

    let gtin_matches = match (scanned.gtin.as_deref(), expected.gtin.as_deref()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    let lot_matches = match (scanned.lot_number.as_deref(), on_file.lot_number.as_deref()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    };
    let expiration_agrees = scanned.expiration_date == on_file.expiration_date;
    let serial_agrees = match (
        scanned.serial_number.as_deref(),
        on_file.serial_number.as_deref(),
    ) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    };

    let accepted = gtin_matches && lot_matches;
    debug!(
        gtin_matches,
        lot_matches,
        expiration_agrees,
        serial_agrees,
        accepted,
        "gate_verdict"
    );
    if let Some(recorder) = metrics_recorder() {
        recorder.record_gate(accepted, start.elapsed());
    }
    accepted
}
