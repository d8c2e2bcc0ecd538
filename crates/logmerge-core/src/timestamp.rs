// Rust guideline compliant 2026-02-06

//! Leading-timestamp extraction.
//!
//! A [`TimestampFormat`] is compiled once from a caller-supplied pattern and
//! shared by every source through a single [`TimestampExtractor`]. Lines whose
//! prefix does not match the format carry no timestamp and are treated as
//! continuation lines by the merge.

use crate::{Error, Result};
use chrono::format::{self, Item, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// A parsed leading timestamp.
///
/// Only ordering matters to the merge; no timezone is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Wraps a naive date-time.
    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// Returns the underlying naive date-time.
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sort key of a line group.
///
/// `Untimed` covers lines at the start of a source that precede its first
/// timestamped line. It orders before every `At` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupTime {
    /// Leading lines without a parseable timestamp.
    Untimed,
    /// A group headed by a timestamped line.
    At(Timestamp),
}

impl fmt::Display for GroupTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupTime::Untimed => f.write_str("untimed"),
            GroupTime::At(ts) => ts.fmt(f),
        }
    }
}

/// A validated timestamp format.
///
/// Patterns containing `%` are taken as chrono strftime syntax. Anything else
/// is read as a SimpleDateFormat-style pattern (`yyyy-MM-dd HH:mm:ss,SSS`) and
/// translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    pattern: String,
    strftime: String,
}

impl TimestampFormat {
    /// Compiles a pattern.
    ///
    /// # Arguments
    ///
    /// * `pattern` - strftime or SimpleDateFormat-style pattern
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if:
    /// - The pattern is empty
    /// - It uses an unsupported pattern letter or an invalid `%` directive
    /// - It has an unterminated quoted literal
    /// - It contains no date or time field at all
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "timestamp format cannot be empty".to_string(),
            ));
        }

        let strftime = if pattern.contains('%') {
            pattern.to_string()
        } else {
            translate_date_pattern(pattern)?
        };
        validate_strftime(pattern, &strftime)?;

        Ok(Self {
            pattern: pattern.to_string(),
            strftime,
        })
    }

    /// The pattern as supplied by the caller.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The equivalent chrono strftime pattern.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }
}

/// Parses leading timestamps from lines.
#[derive(Debug, Clone)]
pub struct TimestampExtractor {
    format: TimestampFormat,
}

impl TimestampExtractor {
    /// Creates an extractor for a compiled format.
    pub fn new(format: TimestampFormat) -> Self {
        Self { format }
    }

    /// Compiles `pattern` and creates an extractor for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the pattern is rejected by
    /// [`TimestampFormat::parse`].
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        TimestampFormat::parse(pattern).map(Self::new)
    }

    /// Returns the format this extractor parses.
    pub fn format(&self) -> &TimestampFormat {
        &self.format
    }

    /// Parses the timestamp at the start of `line`.
    ///
    /// Text after the timestamp is ignored. Missing date fields default to
    /// 1970-01-01. A missing year alone defaults to 1970, and a day past the
    /// end of its month rolls into the next month. A missing time defaults to
    /// midnight; otherwise a missing AM/PM marker means AM and missing
    /// minutes or seconds mean zero.
    ///
    /// # Returns
    ///
    /// The timestamp, or `None` when the line does not start with one.
    pub fn extract(&self, line: &str) -> Option<Timestamp> {
        let mut parsed = Parsed::new();
        format::parse_and_remainder(&mut parsed, line, StrftimeItems::new(&self.format.strftime))
            .ok()?;

        let date = resolve_date(&parsed)?;
        let time = resolve_time(&parsed)?;
        Some(Timestamp(date.and_time(time)))
    }
}

const DEFAULT_YEAR: i32 = 1970;

fn resolve_date(parsed: &Parsed) -> Option<NaiveDate> {
    match parsed.to_naive_date() {
        Ok(date) => Some(date),
        Err(err) if err.kind() == ParseErrorKind::NotEnough => {
            let (Some(month), Some(day)) = (parsed.month(), parsed.day()) else {
                return NaiveDate::from_ymd_opt(DEFAULT_YEAR, 1, 1);
            };
            // Feb 29 without a year lands on Mar 1.
            NaiveDate::from_ymd_opt(DEFAULT_YEAR, month, 1)?
                .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
        }
        Err(_) => None,
    }
}

fn resolve_time(parsed: &Parsed) -> Option<NaiveTime> {
    let has_hour = parsed.hour_div_12().is_some() || parsed.hour_mod_12().is_some();
    if !has_hour && parsed.minute().is_none() && parsed.second().is_none() {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }

    let mut filled = parsed.clone();
    if parsed.hour_mod_12().is_none() {
        filled.set_hour12(12).ok()?;
    }
    if parsed.hour_div_12().is_none() {
        filled.set_ampm(false).ok()?;
    }
    if parsed.minute().is_none() {
        filled.set_minute(0).ok()?;
    }
    filled.to_naive_time().ok()
}

fn validate_strftime(pattern: &str, strftime: &str) -> Result<()> {
    let mut fields = 0usize;
    for item in StrftimeItems::new(strftime) {
        match item {
            Item::Error => {
                return Err(Error::InvalidConfiguration(format!(
                    "invalid timestamp format '{}'",
                    pattern
                )))
            }
            Item::Numeric(..) | Item::Fixed(..) => fields += 1,
            _ => {}
        }
    }

    if fields == 0 {
        return Err(Error::InvalidConfiguration(format!(
            "timestamp format '{}' has no date or time fields",
            pattern
        )));
    }
    Ok(())
}

/// Translates a SimpleDateFormat-style pattern into strftime syntax.
fn translate_date_pattern(pattern: &str) -> Result<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            let mut closed = false;
            while j < chars.len() {
                if chars[j] == '\'' {
                    if chars.get(j + 1) == Some(&'\'') {
                        out.push('\'');
                        j += 2;
                        continue;
                    }
                    closed = true;
                    break;
                }
                push_literal(&mut out, chars[j]);
                j += 1;
            }
            if !closed {
                return Err(Error::InvalidConfiguration(format!(
                    "unterminated quote in timestamp format '{}'",
                    pattern
                )));
            }
            i = j + 1;
            continue;
        }

        if c.is_ascii_alphabetic() {
            let run = chars[i..].iter().take_while(|&&next| next == c).count();
            out.push_str(letter_directive(pattern, c, run)?);
            i += run;
            continue;
        }

        push_literal(&mut out, c);
        i += 1;
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn letter_directive(pattern: &str, letter: char, run: usize) -> Result<&'static str> {
    let directive = match (letter, run) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1 | 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', _) => "%d",
        ('H', _) => "%H",
        ('h', _) => "%I",
        ('m', _) => "%M",
        ('s', _) => "%S",
        ('S', 3) => "%3f",
        ('S', 6) => "%6f",
        ('S', 9) => "%9f",
        ('a', _) => "%p",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('Z' | 'X', _) => "%z",
        _ => {
            return Err(Error::InvalidConfiguration(format!(
                "unsupported field '{}' in timestamp format '{}'",
                letter.to_string().repeat(run),
                pattern
            )))
        }
    };
    Ok(directive)
}
