//! GS1 element-string tokenizers.
//!
//! Two encodings reach us: the human-readable bracketed form
//! `(01)…(17)…(10)…` and the raw concatenated form the symbology actually
//! carries, where variable-length fields end at an FNC1 group separator
//! (or, on one keyboard-wedge scanner model, at a literal `029` standing in
//! for FNC1). Both tokenizers are pure and fail-soft: unusable stretches
//! are skipped, never fatal.

use chrono::NaiveDate;
use tracing::trace;

use crate::types::{ApplicationIdentifierEntry, RawFields};

/// ASCII 29, the FNC1 group separator as it survives keyboard wedges.
pub(crate) const GROUP_SEPARATOR: char = '\u{1d}';

/// Application identifiers this pipeline decodes. `None` length means
/// variable-length, terminated by a separator or the next AI.
const KNOWN_AIS: &[(&str, Option<usize>)] = &[
    ("01", Some(14)), // GTIN
    ("10", None),     // lot/batch
    ("17", Some(6)),  // expiration date YYMMDD
    ("21", None),     // serial number
    ("30", None),     // quantity
];

fn ai_value_len(ai: &str) -> Option<Option<usize>> {
    KNOWN_AIS
        .iter()
        .find(|(code, _)| *code == ai)
        .map(|(_, len)| *len)
}

fn is_known_ai(ai: &str) -> bool {
    ai_value_len(ai).is_some()
}

/// Decode a `YYMMDD` expiration into a calendar date.
///
/// Year is `2000 + YY`. A day of `00` means "end of month" in GS1 usage and
/// maps to the last day of that month. Anything non-calendar yields `None`.
pub(crate) fn decode_yymmdd(value: &str) -> Option<NaiveDate> {
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = value[0..2].parse().ok()?;
    let mm: u32 = value[2..4].parse().ok()?;
    let dd: u32 = value[4..6].parse().ok()?;
    let year = 2000 + yy;
    if dd == 0 {
        return last_day_of_month(year, mm);
    }
    NaiveDate::from_ymd_opt(year, mm, dd)
}

/// Decode the `MM/DD/YY` form used by scanner-app diagnostic dumps.
pub(crate) fn decode_mmddyy(value: &str) -> Option<NaiveDate> {
    let mut parts = value.trim().splitn(3, '/');
    let mm: u32 = parts.next()?.parse().ok()?;
    let dd: u32 = parts.next()?.parse().ok()?;
    let yy: i32 = parts.next()?.trim().parse().ok()?;
    if yy < 0 || yy > 99 {
        return None;
    }
    NaiveDate::from_ymd_opt(2000 + yy, mm, dd)
}

/// Accept the handful of date spellings the fallback inputs use:
/// ISO `YYYY-MM-DD`, `MM/DD/YY`, and bare `YYMMDD`.
pub(crate) fn decode_date_flexible(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if trimmed.contains('/') {
        return decode_mmddyy(trimmed);
    }
    decode_yymmdd(trimmed)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Route one decoded AI value into the field set. First occurrence wins.
fn assign(ai: &str, value: &str, fields: &mut RawFields) {
    match ai {
        "01" => fields.set_gtin(value),
        "10" => fields.set_lot(value),
        "17" => fields.set_expiration(decode_yymmdd(value)),
        "21" => fields.set_serial(value),
        "30" => {
            let digits: String = value.chars().filter(char::is_ascii_digit).collect();
            fields.set_quantity(digits.parse().ok());
        }
        _ => {}
    }
}

/// Tokenize the bracketed form: `(AI)` then everything up to the next `(`
/// or end of string, whitespace-trimmed, as that AI's value.
pub(crate) fn tokenize_bracketed(text: &str) -> (RawFields, Vec<ApplicationIdentifierEntry>) {
    let mut fields = RawFields::default();
    let mut entries = Vec::new();
    let mut rest = text.trim();

    while let Some(open) = rest.find('(') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find(')') else {
            break;
        };
        let code = &after_open[..close];
        let after_close = &after_open[close + 1..];
        let value_end = after_close.find('(').unwrap_or(after_close.len());
        let value = after_close[..value_end].trim();

        if (2..=4).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit()) {
            trace!(ai = code, value, "bracketed token");
            entries.push(ApplicationIdentifierEntry {
                code: code.to_string(),
                value: value.to_string(),
            });
            assign(code, value, &mut fields);
        }
        rest = &after_close[value_end..];
    }

    (fields, entries)
}

/// Tokenize the concatenated form.
///
/// Walks the string AI by AI: fixed-length AIs consume exactly their length;
/// variable-length AIs consume until an FNC1 separator, a `029` artifact
/// standing before a known AI, or the next known AI. Unknown characters are
/// skipped one at a time. First occurrence of each field wins.
pub(crate) fn tokenize_concatenated(text: &str) -> (RawFields, Vec<ApplicationIdentifierEntry>) {
    let mut fields = RawFields::default();
    let mut entries = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;

    while pos + 2 <= chars.len() {
        let ai: String = chars[pos..pos + 2].iter().collect();
        let Some(expected_len) = ai_value_len(&ai) else {
            pos += 1;
            continue;
        };
        pos += 2;

        let value: String = match expected_len {
            Some(len) => {
                if pos + len > chars.len() {
                    break;
                }
                let value: String = chars[pos..pos + len].iter().collect();
                pos += len;
                pos += separator_len(&chars, pos);
                value
            }
            None => {
                let mut value = String::new();
                while pos < chars.len() {
                    let skip = separator_len(&chars, pos);
                    if skip > 0 {
                        pos += skip;
                        break;
                    }
                    if next_is_known_ai(&chars, pos) {
                        break;
                    }
                    value.push(chars[pos]);
                    pos += 1;
                }
                value
            }
        };

        trace!(ai = %ai, value = %value, "concatenated token");
        entries.push(ApplicationIdentifierEntry {
            code: ai.clone(),
            value: value.clone(),
        });
        assign(&ai, &value, &mut fields);
    }

    (fields, entries)
}

/// Length of a field separator at `pos`: an FNC1 character, or the literal
/// `029` a wedge scanner emits in its place when a known AI follows.
fn separator_len(chars: &[char], pos: usize) -> usize {
    if pos < chars.len() && chars[pos] == GROUP_SEPARATOR {
        return 1;
    }
    if pos + 5 <= chars.len()
        && chars[pos] == '0'
        && chars[pos + 1] == '2'
        && chars[pos + 2] == '9'
    {
        let following: String = chars[pos + 3..pos + 5].iter().collect();
        if is_known_ai(&following) {
            return 3;
        }
    }
    0
}

fn next_is_known_ai(chars: &[char], pos: usize) -> bool {
    if pos + 2 > chars.len() {
        return false;
    }
    let candidate: String = chars[pos..pos + 2].iter().collect();
    is_known_ai(&candidate)
}
