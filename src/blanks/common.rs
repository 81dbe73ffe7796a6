//! Common utilities for blank generation.
//!
//! Shared helpers for date formatting, holder-name abbreviation and output
//! filenames.

use chrono::{Datelike, NaiveDate};
use std::path::Path;

/// Russian month names in the genitive case, as printed on the licence
/// issue-date line (e.g. "октября").
pub const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// How the month component of a decomposed date is stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStyle {
    /// Genitive month name, used for the hunting-licence issue date.
    GenitiveName,
    /// Two-digit numeric month, used for the generic back-side issue date.
    TwoDigit,
}

pub fn pad2(value: u32) -> String {
    format!("{value:02}")
}

pub fn genitive_month(date: NaiveDate) -> &'static str {
    MONTHS_GENITIVE[(date.month0() as usize).min(MONTHS_GENITIVE.len() - 1)]
}

pub fn month_text(date: NaiveDate, style: MonthStyle) -> String {
    match style {
        MonthStyle::GenitiveName => genitive_month(date).to_string(),
        MonthStyle::TwoDigit => pad2(date.month()),
    }
}

pub fn two_digit_year(date: NaiveDate) -> String {
    format!("{:02}", date.year().rem_euclid(100))
}

/// Format a date as `dd.mm.yy`, the plain form used in resource rows.
pub fn short_date(date: NaiveDate) -> String {
    format!(
        "{:02}.{:02}.{:02}",
        date.day(),
        date.month(),
        date.year().rem_euclid(100)
    )
}

/// Parse a `YYYY-MM-DD` form value. Anything else is treated as absent.
pub fn parse_form_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Abbreviate "Фамилия Имя Отчество" to "Фамилия И.О." for the voucher.
///
/// Only the second and third whitespace-separated tokens are shortened; a
/// name with fewer than two tokens is returned unmodified.
pub fn abbreviate_full_name(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    if parts.len() < 2 {
        return full_name.to_string();
    }

    let mut short = parts[0].to_string();
    short.push(' ');
    for part in parts.iter().skip(1).take(2) {
        if let Some(initial) = part.chars().next() {
            short.push(initial);
            short.push('.');
        }
    }
    short
}

/// Sanitize a string for use in download filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_sep = false;

    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            result.push(ch);
            last_sep = false;
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !last_sep && !result.is_empty() {
                result.push('_');
                last_sep = true;
            }
        }
    }

    let result = result.trim_matches('_').to_string();
    if result.is_empty() {
        fallback.to_string()
    } else {
        result
    }
}

/// Get the static assets directory path.
pub fn get_static_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}
