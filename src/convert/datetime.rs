use crate::convert::culture::parse_clock;
use crate::convert::ConvertContext;
use crate::convert::Culture;
use crate::spreadsheet::cell::CellValue;
use chrono::DateTime;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

/// Serial number of 10000-01-01, the first date past the supported range.
const SERIAL_UPPER_BOUND: f64 = 2_958_466.0;

/// Unix seconds of 1900-01-01T00:00:00Z; smaller values are not timestamps.
const UNIX_SECONDS_1900: f64 = -2_208_988_800.0;

const MILLISECONDS_PER_DAY: f64 = 86_400_000.0;

/// Zero value of non-nullable date targets: 1900-01-01 00:00:00.
pub(crate) fn default_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .expect("NaiveDate Literal")
        .and_time(NaiveTime::MIN)
}

/// Day zero of the 1900 date system as counted after 1900-03-01.
fn serial_base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .expect("NaiveDate Literal")
        .and_time(NaiveTime::MIN)
}

/// Converts a 1900-system serial number to a date/time.
///
/// The 1900 system counts a fictitious 1900-02-29 as serial 60, so serials in
/// `[60, 61)` have no date and serials below 61 are shifted forward one day.
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..SERIAL_UPPER_BOUND).contains(&serial) {
        return None;
    }
    if (60.0..61.0).contains(&serial) {
        return None;
    }
    let days = if serial < 61.0 { serial + 1.0 } else { serial };
    let milliseconds = (days * MILLISECONDS_PER_DAY).round() as i64;
    serial_base().checked_add_signed(Duration::milliseconds(milliseconds))
}

/// Converts a date/time to a 1900-system serial number.
pub fn to_serial(value: &NaiveDateTime) -> f64 {
    let days = (*value - serial_base()).num_milliseconds() as f64 / MILLISECONDS_PER_DAY;
    if days < 61.0 { days - 1.0 } else { days }
}

/// Converts a raw cell to a naive date/time.
pub(crate) fn to_datetime(raw: &CellValue, context: &ConvertContext) -> Option<NaiveDateTime> {
    match raw {
        CellValue::DateTime(value) => Some(*value),
        CellValue::Number(value) => from_serial(*value),
        CellValue::Text(text) => parse_datetime(text.trim(), context),
        _ => None,
    }
}

/// Text fallback chain: ISO 8601, serial number, format hint, culture, invariant culture.
fn parse_datetime(text: &str, context: &ConvertContext) -> Option<NaiveDateTime> {
    parse_iso(text)
        .or_else(|| parse_plain_number(text).and_then(from_serial))
        .or_else(|| context.format.and_then(|format| parse_with_format(text, format)))
        .or_else(|| context.culture.parse_datetime(text))
        .or_else(|| {
            if context.culture.is_invariant() {
                None
            } else {
                Culture::invariant().parse_datetime(text)
            }
        })
}

/// Plain decimal notation only, so grouped numbers never read as serials.
fn parse_plain_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(value);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Parses with a strftime pattern that may describe a date/time, a date or a time.
fn parse_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            NaiveTime::parse_from_str(text, format)
                .ok()
                .map(|time| default_epoch().date().and_time(time))
        })
}

/// Converts a raw cell to a time of day.
pub(crate) fn to_time(raw: &CellValue, context: &ConvertContext) -> Option<NaiveTime> {
    match raw {
        CellValue::DateTime(value) => Some(value.time()),
        CellValue::TimeSpan(value) => time_of_day(*value),
        CellValue::Number(value) => time_from_number(*value),
        CellValue::Text(text) => {
            let text = text.trim();
            parse_clock(text)
                .or_else(|| parse_plain_number(text).and_then(time_from_number))
                .or_else(|| context.format.and_then(|format| parse_with_format(text, format)).map(|value| value.time()))
                .or_else(|| parse_datetime(text, context).map(|value| value.time()))
        }
        _ => None,
    }
}

/// A fraction of a day below 1 is a bare time; larger values are serial dates.
fn time_from_number(value: f64) -> Option<NaiveTime> {
    if (0.0..1.0).contains(&value) {
        time_of_day(Duration::milliseconds((value * MILLISECONDS_PER_DAY).round() as i64))
    } else {
        from_serial(value).map(|datetime| datetime.time())
    }
}

fn time_of_day(value: Duration) -> Option<NaiveTime> {
    if value < Duration::zero() || value >= Duration::days(1) {
        return None;
    }
    Some(NaiveTime::MIN.overflowing_add_signed(value).0)
}

/// Converts a raw cell to a date/time with offset. Naive values are taken as UTC.
pub(crate) fn to_timestamp(raw: &CellValue, context: &ConvertContext) -> Option<DateTime<FixedOffset>> {
    match raw {
        CellValue::DateTime(value) => Some(value.and_utc().fixed_offset()),
        CellValue::Number(value) => timestamp_from_number(*value),
        CellValue::Text(text) => {
            let text = text.trim();
            parse_timestamp(text)
                .or_else(|| parse_plain_number(text).and_then(timestamp_from_number))
                .or_else(|| context.format.and_then(|format| DateTime::parse_from_str(text, format).ok()))
                .or_else(|| parse_datetime(text, context).map(|value| value.and_utc().fixed_offset()))
        }
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f %z"))
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Serial numbers are tried first; values outside the serial range are
/// Unix seconds, bounded below by 1900-01-01.
fn timestamp_from_number(value: f64) -> Option<DateTime<FixedOffset>> {
    if !value.is_finite() {
        return None;
    }
    if (0.0..SERIAL_UPPER_BOUND).contains(&value) {
        return from_serial(value).map(|datetime| datetime.and_utc().fixed_offset());
    }
    if value < UNIX_SECONDS_1900 {
        return None;
    }
    DateTime::from_timestamp_millis((value * 1000.0).round() as i64).map(|datetime| datetime.fixed_offset())
}
