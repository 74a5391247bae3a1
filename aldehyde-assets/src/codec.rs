//! Conversion between one asset and one line of the storage file.
//!
//! A line holds the seven record fields in fixed order, separated by `,`,
//! optionally followed by the asset id:
//!
//! ```text
//! name,category,location,purchase date,description,purchase value,warranty date[,id]
//! ```
//!
//! Dates are `YYYY-MM-DD` or the literal [`NO_DATE`] sentinel. Inside text
//! fields `\` and `,` are escaped with a backslash and line breaks are written
//! as `\n` / `\r`. Whitespace at either end of a field is written as
//! `\u{hex}` so that trimming on decode does not remove it. Unknown escapes are
//! kept verbatim, so files written without any escaping still load.

use std::borrow::Cow;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::error::CodecError;
use crate::record::{AssetId, AssetRecord};

pub const DELIMITER: char = ',';
pub const NO_DATE: &str = "No date provided";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const PURCHASE_DATE: &str = "purchase date";
pub const WARRANTY_DATE: &str = "warranty expiration date";

const ESCAPE: char = '\\';
const RECORD_FIELDS: usize = 7;

/// Result of decoding one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Absent for lines written before ids were stored.
    pub id: Option<AssetId>,
    pub record: AssetRecord,
    /// Date fields that were neither a date nor the sentinel; each decoded as "no date".
    pub date_issues: Vec<CodecError>,
}

/// Encodes a record and its id as a single line (without the trailing newline).
pub fn encode(id: AssetId, record: &AssetRecord) -> String {
    let fields = [
        escape(&record.name),
        escape(&record.category),
        escape(&record.location),
        format_date(record.purchase_date),
        escape(&record.description),
        escape(&record.purchase_value),
        format_date(record.warranty_expiration_date),
        Cow::Owned(id.to_string()),
    ];

    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        line.push_str(field);
    }
    line
}

/// Decodes one stored line.
///
/// Surrounding whitespace is trimmed from every field before unescaping, so
/// legacy `, ` separators decode cleanly and escaped edge whitespace is kept.
pub fn decode(line: &str) -> Result<Decoded, CodecError> {
    let raw = split_fields(line);
    if !(RECORD_FIELDS..=RECORD_FIELDS + 1).contains(&raw.len()) {
        return Err(CodecError::MalformedRecord { found: raw.len() });
    }

    let id = match raw.get(RECORD_FIELDS).map(|f| f.trim()) {
        Some("") | None => None,
        Some(text) => Some(
            text.parse()
                .map_err(|_| CodecError::InvalidId(text.to_string()))?,
        ),
    };

    let field = |index: usize| unescape(raw[index].trim()).into_owned();

    let mut date_issues = Vec::new();
    let mut date = |index: usize, label: &'static str| match parse_date(label, &field(index)) {
        Ok(date) => date,
        Err(issue) => {
            date_issues.push(issue);
            None
        }
    };
    let purchase_date = date(3, PURCHASE_DATE);
    let warranty_expiration_date = date(6, WARRANTY_DATE);

    let record = AssetRecord {
        name: field(0),
        category: field(1),
        location: field(2),
        purchase_date,
        description: field(4),
        purchase_value: field(5),
        warranty_expiration_date,
    };

    Ok(Decoded {
        id,
        record,
        date_issues,
    })
}

/// Parses a date field. The sentinel means "no date".
///
/// `field` only labels the error.
pub fn parse_date(field: &'static str, text: &str) -> Result<Option<NaiveDate>, CodecError> {
    let text = text.trim();
    if text == NO_DATE {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(Some)
        .map_err(|source| CodecError::UnparseableDate {
            field,
            text: text.to_string(),
            source,
        })
}

pub fn format_date(date: Option<NaiveDate>) -> Cow<'static, str> {
    match date {
        Some(date) => Cow::Owned(date.format(DATE_FORMAT).to_string()),
        None => Cow::Borrowed(NO_DATE),
    }
}

/// Splits on delimiters not preceded by an escape. Fields are returned raw.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(RECORD_FIELDS + 1);
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            DELIMITER => {
                fields.push(&line[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

fn escape(field: &str) -> Cow<'_, str> {
    let lead = field.len() - field.trim_start().len();
    let trail = field.trim_end().len();
    if lead == 0 && trail == field.len() && !field.contains([ESCAPE, DELIMITER, '\n', '\r']) {
        return Cow::Borrowed(field);
    }

    let mut out = String::with_capacity(field.len() + 8);
    for (i, c) in field.char_indices() {
        match c {
            ESCAPE | DELIMITER => {
                out.push(ESCAPE);
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if i < lead || i >= trail => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(ESCAPE) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(ESCAPE) => out.push(ESCAPE),
            Some(DELIMITER) => out.push(DELIMITER),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('u') => match unicode_escape(&mut chars) {
                Some(c) => out.push(c),
                None => {
                    out.push(ESCAPE);
                    out.push('u');
                }
            },
            // Left as written: legacy files were never escaped.
            Some(other) => {
                out.push(ESCAPE);
                out.push(other);
            }
            None => out.push(ESCAPE),
        }
    }
    Cow::Owned(out)
}

/// Reads `{hex}` after `\u`, advancing `chars` only when it is a valid code point.
fn unicode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let rest = chars.as_str();
    let body = rest.strip_prefix('{')?;
    let close = body.find('}')?;
    let c = u32::from_str_radix(&body[..close], 16)
        .ok()
        .and_then(char::from_u32)?;
    *chars = body[close + 1..].chars();
    Some(c)
}
