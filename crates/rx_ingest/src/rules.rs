//! The rewrite-rule table for known scanner insertion defects.
//!
//! Each rule is a compiled regex plus a capture-group replacement, scoped to
//! the scan source that exhibits the defect. The table is ordered, loaded
//! once, and consulted on every correction pass.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ScanSource;

/// A single artifact-rewrite rule.
#[derive(Debug)]
pub struct CorrectionRule {
    /// Stable rule name, used in traces.
    pub name: &'static str,
    /// Anchored pattern describing the defective layout.
    pub pattern: Regex,
    /// Capture-group replacement that drops the spurious content.
    pub replacement: &'static str,
    /// Source this defect is known from; `None` applies to every source.
    pub source: Option<ScanSource>,
}

impl CorrectionRule {
    /// Whether the rule is in scope for a given scan source.
    pub fn applies_to(&self, source: ScanSource) -> bool {
        match self.source {
            Some(scoped) => scoped == source,
            None => true,
        }
    }
}

static RULES: Lazy<Vec<CorrectionRule>> = Lazy::new(|| {
    vec![
        // A keyboard-wedge scanner model emits the literal digits 029 where
        // the FNC1 separator belongs, immediately before the expiration AI
        // 17. Drop the spurious group, keeping GTIN, serial, expiration and
        // lot in their original order.
        CorrectionRule {
            name: "wedge_029_before_expiration",
            pattern: Regex::new(r"^(01\d{14})(21\d+?)(029)(17\d{6})(10.+)$")
                .unwrap_or_else(|err| panic!("static rule pattern must compile: {err}")),
            replacement: "${1}${2}${4}${5}",
            source: Some(ScanSource::HardwareScanner),
        },
    ]
});

/// The process-wide rule table, loaded once.
pub fn correction_rules() -> &'static [CorrectionRule] {
    RULES.as_slice()
}
