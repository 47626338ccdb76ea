//! Temporal text parsing, validation and rendering.
//!
//! Text is parsed the way the engine prints it:
//!
//! | Form | Result |
//! |------|--------|
//! | `[-]Y-M-D` | date |
//! | `[-]Y-M-D h:m:s[.f]` | date and time |
//! | `[-]h:m:s[.f]` | time only |
//!
//! Text with neither a `-` nor a `:` parses to all-zero fields rather than
//! failing. The fraction is always scaled to microseconds.

use crate::error::ConversionError;
use crate::native::{NativeTime, NativeTimeKind};
use crate::sql_type::SqlType;
use crate::value::{DateStruct, TimeStruct, TimestampStruct};

const MICROS_DIGITS: u32 = 6;

/// Minimal `scanf`-style cursor over ASCII text.
struct Fields<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(text: &'a [u8]) -> Self {
        Self { text, pos: 0 }
    }

    /// Read an unsigned decimal field of at most `width` digits after optional spaces.
    fn number(&mut self, width: usize) -> Option<(u32, usize)> {
        while self.text.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
        if self.text.get(self.pos) == Some(&b'+') {
            self.pos += 1;
        }
        let start = self.pos;
        let mut value: u32 = 0;
        while self.pos - start < width {
            match self.text.get(self.pos) {
                Some(b) if b.is_ascii_digit() => {
                    value = value.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let digits = self.pos - start;
        (digits > 0).then_some((value, digits))
    }

    fn literal(&mut self, c: u8) -> bool {
        if self.text.get(self.pos) == Some(&c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Read `N<sep>N<sep>N`, returning how many fields matched.
    fn triple(&mut self, sep: u8, out: &mut [u32; 3]) -> usize {
        for (i, slot) in out.iter_mut().enumerate() {
            if i > 0 && !self.literal(sep) {
                return i;
            }
            match self.number(usize::MAX) {
                Some((v, _)) => *slot = v,
                None => return i,
            }
        }
        3
    }
}

fn normalize_year(year: u32) -> u32 {
    match year {
        1..=69 => year + 2000,
        70..=99 => year + 1900,
        _ => year,
    }
}

/// Parse temporal text into native fields.
///
/// Returns the fields and whether the text held a time of day only.
/// Two-digit years are widened (`< 70` to 20xx, `70..=99` to 19xx) unless
/// `interval` is set.
///
/// # Errors
///
/// [`ConversionError::DatetimeFieldOverflow`] when a date or time part is
/// present but its fields cannot be read.
pub fn parse_temporal(text: &[u8], interval: bool) -> Result<(NativeTime, bool), ConversionError> {
    let mut tm = NativeTime::default();
    let start = text
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(text.len());
    let mut rest = &text[start..];
    if rest.is_empty() {
        return Ok((tm, false));
    }
    if rest[0] == b'-' {
        tm.negative = true;
        rest = &rest[1..];
    }

    let mut is_date = false;
    let mut time_only = false;

    if rest.contains(&b'-') {
        let mut date = [0u32; 3];
        if Fields::new(rest).triple(b'-', &mut date) < 3 {
            return Err(ConversionError::field_overflow("date"));
        }
        [tm.year, tm.month, tm.day] = date;
        is_date = true;
        tm.kind = NativeTimeKind::Date;
        rest = match rest.iter().position(|&b| b == b' ') {
            Some(space) => &rest[space..],
            None => &[],
        };
    }

    if rest.contains(&b':') {
        let mut fields = Fields::new(rest);
        let mut clock = [0u32; 3];
        if fields.triple(b':', &mut clock) < 3 {
            return Err(ConversionError::field_overflow("time"));
        }
        [tm.hour, tm.minute, tm.second] = clock;

        if rest.contains(&b'.') {
            if !fields.literal(b'.') {
                return Err(ConversionError::field_overflow("fraction"));
            }
            let (fraction, digits) = fields
                .number(MICROS_DIGITS as usize)
                .ok_or_else(|| ConversionError::field_overflow("fraction"))?;
            // digits is at most 6
            tm.microsecond = fraction * 10u32.pow(MICROS_DIGITS - digits as u32);
        }

        if is_date {
            tm.kind = NativeTimeKind::DateTime;
        } else {
            time_only = true;
            tm.kind = NativeTimeKind::Time;
        }
    }

    if !interval && is_date {
        tm.year = normalize_year(tm.year);
    }
    Ok((tm, time_only))
}

/// Copy native fields into a timestamp struct (fraction in nanoseconds).
#[must_use]
pub fn native_to_timestamp(tm: &NativeTime) -> TimestampStruct {
    TimestampStruct {
        year: i16::try_from(tm.year).unwrap_or(i16::MAX),
        month: u16::try_from(tm.month).unwrap_or(u16::MAX),
        day: u16::try_from(tm.day).unwrap_or(u16::MAX),
        hour: u16::try_from(tm.hour).unwrap_or(u16::MAX),
        minute: u16::try_from(tm.minute).unwrap_or(u16::MAX),
        second: u16::try_from(tm.second).unwrap_or(u16::MAX),
        fraction: tm.microsecond.saturating_mul(1000),
    }
}

/// Copy a timestamp struct into native date-time fields.
#[must_use]
pub fn timestamp_to_native(ts: &TimestampStruct) -> NativeTime {
    NativeTime {
        year: u32::from(ts.year.unsigned_abs()),
        month: u32::from(ts.month),
        day: u32::from(ts.day),
        hour: u32::from(ts.hour),
        minute: u32::from(ts.minute),
        second: u32::from(ts.second),
        microsecond: ts.fraction / 1000,
        negative: false,
        kind: NativeTimeKind::DateTime,
    }
}

fn is_valid_clock(hour: u16, minute: u16, second: u16) -> bool {
    TimeStruct { hour, minute, second }.is_valid()
}

/// Check that `ts` can be stored into a column of `target`.
///
/// A TIME target rejects a non-zero fraction and out-of-range clock fields.
/// A DATE target rejects non-zero time fields. Every other target requires
/// month and day, and a year unless `time_only` is set; violating that is
/// reported as `missing_date`.
///
/// # Errors
///
/// [`ConversionError::InvalidDatetimeFormat`] for field violations, or
/// `missing_date` when calendar fields are absent.
pub fn validate_for_target(
    ts: &TimestampStruct,
    target: SqlType,
    time_only: bool,
    missing_date: ConversionError,
) -> Result<(), ConversionError> {
    match target {
        SqlType::Time => {
            if ts.fraction != 0 {
                return Err(ConversionError::datetime_format("fractional seconds fields are nonzero"));
            }
            if !is_valid_clock(ts.hour, ts.minute, ts.second) {
                return Err(ConversionError::datetime_format("invalid time"));
            }
            return Ok(());
        }
        SqlType::Date => {
            if ts.hour != 0 || ts.minute != 0 || ts.second != 0 || ts.fraction != 0 {
                return Err(ConversionError::datetime_format("time fields are nonzero"));
            }
        }
        _ => {}
    }
    if time_only {
        return Ok(());
    }
    if ts.year == 0 || ts.month == 0 || ts.day == 0 {
        return Err(missing_date);
    }
    Ok(())
}

fn needs_date_fields(target: SqlType) -> bool {
    !matches!(target, SqlType::Time)
}

fn needs_time_fields(target: SqlType) -> bool {
    !matches!(target, SqlType::Date)
}

/// Render a date as `Y-M-D` without zero padding.
#[must_use]
pub fn date_to_text(date: &DateStruct) -> String {
    format!("{}-{}-{}", date.year, date.month, date.day)
}

/// Render a time of day as `h:m:s` without zero padding.
///
/// # Errors
///
/// [`ConversionError::InvalidDatetimeFormat`] for an out-of-range clock field.
pub fn time_to_text(time: &TimeStruct) -> Result<String, ConversionError> {
    if !time.is_valid() {
        return Err(ConversionError::datetime_format("invalid time"));
    }
    Ok(format!("{}:{}:{}", time.hour, time.minute, time.second))
}

/// Render a timestamp for a column of `target`.
///
/// DATE targets get the date part, TIME targets the clock part, and all
/// others the full value with a six-digit microsecond fraction when it is
/// non-zero. The value is validated with [`validate_for_target`] first.
///
/// # Errors
///
/// See [`validate_for_target`].
pub fn timestamp_to_text(ts: &TimestampStruct, target: SqlType) -> Result<String, ConversionError> {
    validate_for_target(
        ts,
        target,
        false,
        ConversionError::datetime_format("date fields are missing"),
    )?;
    let mut out = String::with_capacity(26);
    if needs_date_fields(target) {
        out.push_str(&date_to_text(&ts.date()));
    }
    if needs_date_fields(target) && needs_time_fields(target) {
        out.push(' ');
    }
    if needs_time_fields(target) {
        out.push_str(&format!("{}:{}:{}", ts.hour, ts.minute, ts.second));
        let micros = ts.fraction / 1000;
        if needs_date_fields(target) && micros != 0 {
            out.push_str(&format!(".{micros:06}"));
        }
    }
    Ok(out)
}

/// Render native fields as a zero-padded literal body
/// (`YYYY-MM-DD`, `[-]HH:MM:SS[.ffffff]` or both).
#[must_use]
pub fn native_to_text(tm: &NativeTime) -> String {
    let date = format!("{:04}-{:02}-{:02}", tm.year, tm.month, tm.day);
    let mut clock = format!("{:02}:{:02}:{:02}", tm.hour, tm.minute, tm.second);
    if tm.microsecond != 0 {
        clock.push_str(&format!(".{:06}", tm.microsecond));
    }
    match tm.kind {
        NativeTimeKind::Date => date,
        NativeTimeKind::Time if tm.negative => format!("-{clock}"),
        NativeTimeKind::Time => clock,
        NativeTimeKind::DateTime | NativeTimeKind::None => format!("{date} {clock}"),
    }
}

#[cfg(feature = "chrono")]
mod chrono_interop {
    use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

    use crate::error::ConversionError;
    use crate::value::{DateStruct, TimeStruct, TimestampStruct};

    fn narrow<T: TryFrom<u32>>(v: u32) -> Result<T, ConversionError> {
        T::try_from(v).map_err(|_| ConversionError::datetime_format("field out of range"))
    }

    impl TryFrom<NaiveDate> for DateStruct {
        type Error = ConversionError;

        fn try_from(d: NaiveDate) -> Result<Self, Self::Error> {
            Ok(Self {
                year: i16::try_from(d.year())
                    .map_err(|_| ConversionError::datetime_format("year out of range"))?,
                month: narrow(d.month())?,
                day: narrow(d.day())?,
            })
        }
    }

    impl TryFrom<DateStruct> for NaiveDate {
        type Error = ConversionError;

        fn try_from(d: DateStruct) -> Result<Self, Self::Error> {
            NaiveDate::from_ymd_opt(i32::from(d.year), u32::from(d.month), u32::from(d.day))
                .ok_or_else(|| ConversionError::datetime_format("invalid date"))
        }
    }

    impl From<NaiveTime> for TimeStruct {
        fn from(t: NaiveTime) -> Self {
            // chrono clock fields are always below 60
            Self {
                hour: t.hour() as u16,
                minute: t.minute() as u16,
                second: t.second().min(59) as u16,
            }
        }
    }

    impl TryFrom<TimeStruct> for NaiveTime {
        type Error = ConversionError;

        fn try_from(t: TimeStruct) -> Result<Self, Self::Error> {
            NaiveTime::from_hms_opt(u32::from(t.hour), u32::from(t.minute), u32::from(t.second))
                .ok_or_else(|| ConversionError::datetime_format("invalid time"))
        }
    }

    impl TryFrom<NaiveDateTime> for TimestampStruct {
        type Error = ConversionError;

        fn try_from(dt: NaiveDateTime) -> Result<Self, Self::Error> {
            let mut ts = Self::from_parts(dt.date().try_into()?, dt.time().into());
            ts.fraction = dt.nanosecond().min(999_999_999);
            Ok(ts)
        }
    }

    impl TryFrom<TimestampStruct> for NaiveDateTime {
        type Error = ConversionError;

        fn try_from(ts: TimestampStruct) -> Result<Self, Self::Error> {
            let date = NaiveDate::try_from(ts.date())?;
            let time = NaiveTime::from_hms_nano_opt(
                u32::from(ts.hour),
                u32::from(ts.minute),
                u32::from(ts.second),
                ts.fraction,
            )
            .ok_or_else(|| ConversionError::datetime_format("invalid time"))?;
            Ok(date.and_time(time))
        }
    }
}
