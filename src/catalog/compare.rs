//! Field comparators for sorting the flat record list.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::types::CategoryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Title,
    Status,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSortError {
    #[error("Unknown sort field '{0}' (expected title, status or createdAt)")]
    Field(String),
    #[error("Unknown sort direction '{0}' (expected asc or desc)")]
    Direction(String),
}

impl FromStr for SortField {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            "createdat" | "created_at" => Ok(Self::CreatedAt),
            _ => Err(ParseSortError::Field(s.to_owned())),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseSortError::Direction(s.to_owned())),
        }
    }
}

impl SortField {
    pub fn cycle(self) -> Self {
        match self {
            Self::Title => Self::Status,
            Self::Status => Self::CreatedAt,
            Self::CreatedAt => Self::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::CreatedAt => "createdAt",
        }
    }
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Compare two records on one field.
///
/// `Desc` reverses the result. Equal keys return `Ordering::Equal` so a
/// stable sort keeps input order for ties.
pub fn compare(
    a: &CategoryRecord,
    b: &CategoryRecord,
    field: SortField,
    direction: SortDirection,
) -> Ordering {
    let ord = match field {
        SortField::Title => compare_titles(&a.title, &b.title),
        SortField::Status => a.status.cmp(&b.status),
        SortField::CreatedAt => created_at_millis(a.created_at.as_deref())
            .cmp(&created_at_millis(b.created_at.as_deref())),
    };

    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Stable in-place sort of `records`.
pub fn sort_records(records: &mut [CategoryRecord], field: SortField, direction: SortDirection) {
    records.sort_by(|a, b| compare(a, b, field, direction));
}

/// Natural, case- and accent-insensitive title ordering.
///
/// Titles are compared on a folded key first: canonical decomposition with
/// combining marks removed, lowercased, with the few Latin letters that have
/// no decomposition (`đ`, `ø`, `ł`) mapped to their base letter. "Áo" thus
/// sorts beside "Ao" rather than after "Z". Titles whose keys tie are ordered
/// by their lowercased composed form, so accented variants still compare
/// deterministically. Runs of ASCII digits compare by numeric value at both
/// levels, so "Category 2" sorts before "Category 10".
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    natural_cmp(&collation_key(a), &collation_key(b))
        .then_with(|| natural_cmp(&composed_lower(a), &composed_lower(b)))
}

fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'đ' | 'ð' => 'd',
            'ø' => 'o',
            'ł' => 'l',
            'ħ' => 'h',
            'ı' => 'i',
            other => other,
        })
        .collect()
}

fn composed_lower(s: &str) -> String {
    let lower = s.to_lowercase();
    lower.nfc().collect()
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let na = take_digits(&mut ai);
                let nb = take_digits(&mut bi);
                let ord = compare_digit_runs(&na, &nb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                let ord = ca.cmp(&cb);
                if ord != Ordering::Equal {
                    return ord;
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = it.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Compare two digit strings by value without parsing, so arbitrarily long
/// runs never overflow.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Parse a creation timestamp to unix milliseconds.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC) and
/// bare dates. Missing or unparseable values map to the epoch.
pub fn created_at_millis(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.and_utc().timestamp_millis();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc().timestamp_millis();
        }
    }

    tracing::debug!(created_at = %raw, "Unparseable createdAt, sorting as epoch");
    0
}
