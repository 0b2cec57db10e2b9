//! Fallback parsers for non-GS1 scan formats.
//!
//! Camera apps and manual entry produce a handful of looser shapes: URLs
//! with query parameters, JSON blobs, scanner-app diagnostic dumps with
//! labeled lines, and bare digit runs. Each parser extracts what it can and
//! leaves the rest `None`; none of them can fail.

use tracing::trace;
use url::Url;

use crate::tokenizer::{decode_date_flexible, decode_mmddyy};
use crate::types::RawFields;

/// Extract `gtin`/`lot`/`exp`/`serial` query parameters from a URL.
///
/// Returns `None` when the text is not a URL or carries none of the
/// recognized parameters, so detection can keep falling through.
pub(crate) fn parse_url_query(text: &str) -> Option<RawFields> {
    let parsed = Url::parse(text.trim()).ok()?;
    let mut fields = RawFields::default();
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "gtin" => fields.set_gtin(value.as_ref()),
            "lot" => fields.set_lot(value.as_ref()),
            "exp" => fields.set_expiration(decode_date_flexible(&value)),
            "serial" => fields.set_serial(value.as_ref()),
            _ => {}
        }
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Extract same-named keys from a JSON object payload.
///
/// Returns `None` when the text is not syntactically a JSON object. GTIN
/// and serial values may arrive as JSON numbers; both spellings decode.
pub(crate) fn parse_json_blob(text: &str) -> Option<RawFields> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;
    let mut fields = RawFields::default();

    if let Some(gtin) = object.get("gtin") {
        match gtin {
            serde_json::Value::String(s) => fields.set_gtin(s.trim()),
            serde_json::Value::Number(n) => fields.set_gtin(n.to_string()),
            _ => {}
        }
    }
    if let Some(lot) = object.get("lotNumber").and_then(|v| v.as_str()) {
        fields.set_lot(lot.trim());
    }
    if let Some(exp) = object.get("expirationDate").and_then(|v| v.as_str()) {
        fields.set_expiration(decode_date_flexible(exp));
    }
    match object.get("serialNumber") {
        Some(serde_json::Value::String(s)) => fields.set_serial(s.trim()),
        Some(serde_json::Value::Number(n)) => fields.set_serial(n.to_string()),
        _ => {}
    }
    Some(fields)
}

/// Labels a scanner-app diagnostic dump may carry, matched
/// case-insensitively at line start.
const LINE_LABELS: &[&str] = &["GTIN:", "Lot Number:", "Expiration Date:", "Serial Number:"];

/// Whether text looks like a labeled scanner-app dump.
pub(crate) fn has_labeled_markers(text: &str) -> bool {
    text.lines().any(|line| {
        let trimmed = line.trim();
        LINE_LABELS
            .iter()
            .any(|label| starts_with_ignore_case(trimmed, label))
            || trimmed.eq_ignore_ascii_case("Content")
    })
}

/// Extract labeled fields line by line.
///
/// An `MM/DD/YY` expiration decodes to the same calendar representation as
/// the bracketed case. A `Content` section followed by a bare digit run
/// fills any still-missing fields positionally.
pub(crate) fn parse_labeled_text(text: &str, raw_lot_max_len: usize) -> RawFields {
    let mut fields = RawFields::default();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if let Some(value) = label_value(trimmed, "GTIN:") {
            fields.set_gtin(value);
        } else if let Some(value) = label_value(trimmed, "Lot Number:") {
            fields.set_lot(value);
        } else if let Some(value) = label_value(trimmed, "Expiration Date:") {
            fields.set_expiration(decode_mmddyy(value));
        } else if let Some(value) = label_value(trimmed, "Serial Number:") {
            fields.set_serial(value);
        } else if trimmed.eq_ignore_ascii_case("Content") {
            // The Content section echoes the raw barcode body.
            while let Some(next) = lines.peek() {
                let candidate = next.trim();
                if candidate.is_empty() {
                    lines.next();
                    continue;
                }
                if candidate
                    .get(..14)
                    .is_some_and(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
                {
                    trace!("labeled dump content section decomposed positionally");
                    merge_missing(&mut fields, parse_raw_digits(candidate, raw_lot_max_len));
                }
                break;
            }
        }
    }

    fields
}

/// Positionally decompose a bare digit run of at least 14 characters:
/// 14-digit GTIN, then a 6-digit `YYMMDD` expiration if numeric, then up to
/// `raw_lot_max_len` alphanumerics of lot, with any remainder as the serial.
/// Unparseable residue is discarded; no field is fabricated.
pub(crate) fn parse_raw_digits(text: &str, raw_lot_max_len: usize) -> RawFields {
    let mut fields = RawFields::default();
    let trimmed = text.trim();
    let Some(gtin) = trimmed
        .get(..14)
        .filter(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
    else {
        return fields;
    };

    fields.set_gtin(gtin);
    let mut rest = &trimmed[14..];

    if let Some(exp) = rest
        .get(..6)
        .filter(|chunk| chunk.chars().all(|c| c.is_ascii_digit()))
    {
        fields.set_expiration(crate::tokenizer::decode_yymmdd(exp));
        rest = &rest[6..];
    }

    let lot_len = rest
        .char_indices()
        .take_while(|(i, c)| *i < raw_lot_max_len && c.is_ascii_alphanumeric())
        .count();
    if lot_len > 0 {
        fields.set_lot(&rest[..lot_len]);
        rest = &rest[lot_len..];
    }

    let serial = rest.trim_matches(|c: char| !c.is_ascii_alphanumeric());
    if !serial.is_empty() {
        fields.set_serial(serial);
    }

    fields
}

fn starts_with_ignore_case(line: &str, label: &str) -> bool {
    // Labels are pure ASCII, so byte-level comparison is safe even when the
    // line itself is not.
    line.len() >= label.len() && line.as_bytes()[..label.len()].eq_ignore_ascii_case(label.as_bytes())
}

fn label_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    if starts_with_ignore_case(line, label) {
        line.get(label.len()..).map(str::trim)
    } else {
        None
    }
}

fn merge_missing(fields: &mut RawFields, found: RawFields) {
    if let Some(gtin) = found.gtin {
        fields.set_gtin(gtin);
    }
    if let Some(lot) = found.lot {
        fields.set_lot(lot);
    }
    fields.set_expiration(found.expiration);
    if let Some(serial) = found.serial {
        fields.set_serial(serial);
    }
    fields.set_quantity(found.quantity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn url_query_extraction() {
        let fields = parse_url_query(
            "https://rx.example.com/verify?gtin=00312345678906&lot=ABC123&exp=220615&serial=XYZ987",
        )
        .expect("recognized url");
        assert_eq!(fields.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(fields.lot.as_deref(), Some("ABC123"));
        assert_eq!(fields.expiration, Some(date(2022, 6, 15)));
        assert_eq!(fields.serial.as_deref(), Some("XYZ987"));
    }

    #[test]
    fn url_without_recognized_params_is_skipped() {
        assert!(parse_url_query("https://example.com/?page=2").is_none());
        assert!(parse_url_query("not a url").is_none());
    }

    #[test]
    fn json_blob_extraction() {
        let fields = parse_json_blob(
            r#"{"gtin":"00312345678906","lotNumber":"ABC123","expirationDate":"2022-06-15","serialNumber":987}"#,
        )
        .expect("json object");
        assert_eq!(fields.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(fields.lot.as_deref(), Some("ABC123"));
        assert_eq!(fields.expiration, Some(date(2022, 6, 15)));
        assert_eq!(fields.serial.as_deref(), Some("987"));
    }

    #[test]
    fn json_numeric_gtin_accepted() {
        let fields = parse_json_blob(r#"{"gtin":312345678906}"#).expect("json object");
        assert_eq!(fields.gtin.as_deref(), Some("312345678906"));
    }

    #[test]
    fn json_non_object_is_skipped() {
        assert!(parse_json_blob("[1,2,3]").is_none());
        assert!(parse_json_blob("not json").is_none());
    }

    #[test]
    fn labeled_dump_extraction() {
        let dump = "Scan OK\nGTIN: 00312345678906\nLot Number: ABC123\nExpiration Date: 06/15/22\nSerial Number: XYZ987\n";
        assert!(has_labeled_markers(dump));
        let fields = parse_labeled_text(dump, 20);
        assert_eq!(fields.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(fields.lot.as_deref(), Some("ABC123"));
        assert_eq!(fields.expiration, Some(date(2022, 6, 15)));
        assert_eq!(fields.serial.as_deref(), Some("XYZ987"));
    }

    #[test]
    fn labeled_dump_content_section_fills_missing_fields() {
        let dump = "Content\n\n00312345678906220615ABC123\nLot Number: REAL-LOT";
        let fields = parse_labeled_text(dump, 20);
        assert_eq!(fields.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(fields.expiration, Some(date(2022, 6, 15)));
        // The content run supplies the lot only because the labeled line
        // comes later; first assignment wins.
        assert_eq!(fields.lot.as_deref(), Some("ABC123"));
    }

    #[test]
    fn raw_digit_positional_decomposition() {
        let fields = parse_raw_digits("00312345678906220615ABC123-XYZ987", 20);
        assert_eq!(fields.gtin.as_deref(), Some("00312345678906"));
        assert_eq!(fields.expiration, Some(date(2022, 6, 15)));
        assert_eq!(fields.lot.as_deref(), Some("ABC123"));
        assert_eq!(fields.serial.as_deref(), Some("XYZ987"));
    }

    #[test]
    fn raw_digits_without_expiration_or_tail() {
        let fields = parse_raw_digits("00312345678906", 20);
        assert_eq!(fields.gtin.as_deref(), Some("00312345678906"));
        assert!(fields.expiration.is_none());
        assert!(fields.lot.is_none());
        assert!(fields.serial.is_none());
    }

    #[test]
    fn raw_digits_too_short_yield_nothing() {
        assert!(parse_raw_digits("0031234567", 20).is_empty());
        assert!(parse_raw_digits("ABCDEFGHIJKLMN", 20).is_empty());
    }
}
