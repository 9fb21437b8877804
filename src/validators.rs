// ✅ Validators - pure predicates over raw user input
// No I/O here: everything that needs the store lives in lookup.rs

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_NAME_LEN: usize = 24;
pub const MAX_COUNTRY_LEN: usize = 24;
pub const PASSPORT_LEN: usize = 10;
pub const MAX_FLIGHT_NUM_LEN: usize = 8;
pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 5;

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(\.[0-9]+)?$").expect("numeric pattern is valid"));

// ============================================================================
// NUMBERS
// ============================================================================

/// Plain numeric literal: optional sign, digits, optional decimal part
pub fn is_numeric(s: &str) -> bool {
    NUMERIC.is_match(s)
}

/// Integer score in [0, 5]
pub fn is_valid_score(s: &str) -> bool {
    parse_score(s).is_some()
}

pub fn parse_score(s: &str) -> Option<i64> {
    if !is_numeric(s) {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
}

/// Non-negative integer row count for the report queries
pub fn parse_count(s: &str) -> Option<u32> {
    if !is_numeric(s) {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .and_then(|n| u32::try_from(n).ok())
}

// ============================================================================
// DATES
// ============================================================================

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Split `YYYY-MM-DD` into calendar fields, `None` unless it is a real date
pub fn parse_date(s: &str) -> Option<(i32, u32, u32)> {
    let fields: Vec<&str> = s.split('-').collect();
    if fields.len() != 3 {
        return None;
    }

    let year = fields[0].parse::<i32>().ok()?;
    let month = fields[1].parse::<u32>().ok()?;
    let day = fields[2].parse::<u32>().ok()?;

    if !(1..=12).contains(&month) {
        return None;
    }
    if day < 1 || day > days_in_month(year, month) {
        return None;
    }

    Some((year, month, day))
}

pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Zero-padded `YYYY-MM-DD` form of a valid date
pub fn normalize_date(s: &str) -> Option<String> {
    parse_date(s).map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
}

// ============================================================================
// LENGTHS
// ============================================================================

fn len_within(s: &str, max: usize) -> bool {
    let len = s.chars().count();
    len > 0 && len <= max
}

pub fn is_valid_name(s: &str) -> bool {
    len_within(s, MAX_NAME_LEN)
}

pub fn is_valid_country(s: &str) -> bool {
    len_within(s, MAX_COUNTRY_LEN)
}

pub fn is_valid_passport(s: &str) -> bool {
    s.chars().count() == PASSPORT_LEN
}

pub fn is_valid_flight_number(s: &str) -> bool {
    len_within(s, MAX_FLIGHT_NUM_LEN)
}
