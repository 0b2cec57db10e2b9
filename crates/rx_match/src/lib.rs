//! # Cross-format reconciliation
//!
//! Decides whether a scanned identifier and an on-file identifier refer to
//! the same physical unit of the same product, despite different packaging
//! levels, encoding conventions, or scanner artifacts.
//!
//! The crate exposes two deliberately different judgments:
//!
//! - [`compare`] / [`compare_with_config`]: the fuzzy, multi-tier scoring
//!   function used to rank and explain candidate matches across a catalog.
//! - [`matches_record`]: the strict two-field acceptance gate used to
//!   accept or reject a scan against one specific expected shipment record.
//!
//! Every operation is a pure function over immutable inputs plus the
//! process-wide manufacturer rule table; nothing here retains state between
//! calls. Instrumentation goes through `tracing` events and the optional
//! [`ReconcileMetrics`] observer.

mod engine;
mod metrics;
mod types;

pub use engine::{compare, compare_with_config, matches_record};
pub use metrics::{set_reconcile_metrics, ReconcileMetrics};
pub use types::{EpcisShipmentFields, MatchConfig, MatchError, MatchVerdict, VerdictTier};
