//! Day-first, format-tolerant date parsing shared by classification and
//! normalization.
//!
//! A value is split into numeric groups and month names; separators, weekday
//! names, ordinal suffixes and any trailing time of day are ignored. Any other
//! word makes the value unparseable. Ambiguous numeric dates read the first
//! group as the day of the month (`03/04/2024` is 3 April 2024) unless that
//! reading is not a valid date, in which case month-first is tried.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::data::Value;

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const MONTHS: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const FILLER_WORDS: &[&str] = &["of", "the", "at", "on", "utc", "gmt", "z"];
const MERIDIEM: &[&str] = &["am", "pm", "a.m.", "p.m."];
const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Group {
    value: u32,
    digits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Number(Group),
    Month(u32),
    Skip,
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:am|pm|a\.m\.|p\.m\.)?",
            r"|\d{1,2}(?:am|pm|a\.m\.|p\.m\.))",
            r"(?:z|[+-]\d{2}:?\d{2})?$",
        ))
        .expect("time-of-day pattern compiles")
    })
}

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]\d{2}:?\d{2}$").expect("offset pattern compiles"))
}

fn iso_join_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d)t(\d)").expect("ISO join pattern compiles"))
}

/// Parses `value` as a calendar date, preferring day-before-month for
/// ambiguous numeric forms. Returns `None` when the value is not a date.
pub fn parse_date_dayfirst(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() == 10 {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, CANONICAL_DATE_FORMAT) {
            return Some(parsed);
        }
    }

    let lowered = trimmed.to_lowercase();
    let joined = iso_join_pattern().replace_all(&lowered, "$1 $2");
    let mut groups = Vec::with_capacity(3);
    let mut month = None;
    for word in joined.split_whitespace() {
        if MERIDIEM.contains(&word) || time_pattern().is_match(word) || offset_pattern().is_match(word)
        {
            continue;
        }
        for piece in word.split(['-', '/', '.', ',']).filter(|p| !p.is_empty()) {
            match classify_piece(piece)? {
                Piece::Number(group) => groups.push(group),
                Piece::Month(m) => {
                    if month.replace(m).is_some() {
                        return None;
                    }
                }
                Piece::Skip => {}
            }
        }
    }
    resolve(&groups, month)
}

/// Date carried by a cell, if any. Numeric, boolean and missing cells never
/// parse as dates.
pub fn parse_cell_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Text(text) => parse_date_dayfirst(text),
        Value::Date(date) => Some(*date),
        Value::DateTime(datetime) => Some(datetime.date()),
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Missing => None,
    }
}

pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

fn classify_piece(piece: &str) -> Option<Piece> {
    if piece.chars().all(|c| c.is_ascii_digit()) {
        return number_piece(piece);
    }
    for suffix in ORDINAL_SUFFIXES {
        if let Some(digits) = piece.strip_suffix(suffix) {
            if !digits.is_empty() && digits.len() <= 2 && digits.chars().all(|c| c.is_ascii_digit())
            {
                return number_piece(digits);
            }
        }
    }
    if piece.chars().all(|c| c.is_alphabetic()) {
        if let Some(month) = month_number(piece) {
            return Some(Piece::Month(month));
        }
        if is_weekday(piece) || FILLER_WORDS.contains(&piece) {
            return Some(Piece::Skip);
        }
    }
    None
}

fn number_piece(digits: &str) -> Option<Piece> {
    if digits.len() > 8 {
        return None;
    }
    let value = digits.parse::<u32>().ok()?;
    Some(Piece::Number(Group {
        value,
        digits: digits.len(),
    }))
}

fn month_number(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(word))
        .map(|idx| idx as u32 + 1)
}

fn is_weekday(word: &str) -> bool {
    word.len() >= 3 && WEEKDAYS.iter().any(|name| name.starts_with(word))
}

fn resolve(groups: &[Group], month: Option<u32>) -> Option<NaiveDate> {
    match (month, groups) {
        (None, [compact]) if compact.digits == 8 => ymd(
            (compact.value / 10_000) as i32,
            (compact.value / 100) % 100,
            compact.value % 100,
        ),
        (None, [year, month]) if year.digits == 4 && month.digits <= 2 => {
            ymd(year.value as i32, month.value, 1)
        }
        (None, [month, year]) if month.digits <= 2 && year.digits == 4 => {
            ymd(year.value as i32, month.value, 1)
        }
        (None, [first, second, third]) => resolve_numeric(*first, *second, *third),
        (Some(month), [year]) if year.digits == 4 => ymd(year.value as i32, month, 1),
        (Some(month), [first, second]) => {
            if first.digits == 4 && second.digits <= 2 {
                ymd(first.value as i32, month, second.value)
            } else if first.digits <= 2 {
                ymd(expand_year(*second)?, month, first.value)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn resolve_numeric(first: Group, second: Group, third: Group) -> Option<NaiveDate> {
    if first.digits == 4 {
        if second.digits > 2 || third.digits > 2 {
            return None;
        }
        let year = first.value as i32;
        return ymd(year, second.value, third.value).or_else(|| ymd(year, third.value, second.value));
    }
    if first.digits > 2 || second.digits > 2 {
        return None;
    }
    let year = expand_year(third)?;
    ymd(year, second.value, first.value).or_else(|| ymd(year, first.value, second.value))
}

// Two-digit years pivot at 69, the same window `%y` uses.
fn expand_year(group: Group) -> Option<i32> {
    match group.digits {
        4 => Some(group.value as i32),
        1 | 2 if group.value < 69 => Some(2000 + group.value as i32),
        1 | 2 => Some(1900 + group.value as i32),
        _ => None,
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
