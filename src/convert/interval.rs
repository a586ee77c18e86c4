use crate::convert::ConvertContext;
use crate::spreadsheet::cell::CellValue;
use chrono::Duration;
use chrono::NaiveTime;
use iso8601_duration::Duration as IsoDuration;

/// Converts a raw cell to a time interval.
///
/// Numbers are fractional days. Text is tried as `[-][d.]hh:mm[:ss[.fff]]`,
/// then as a number of days, then as an ISO 8601 duration (`PT1H30M`).
pub(crate) fn to_interval(raw: &CellValue, _context: &ConvertContext) -> Option<Duration> {
    match raw {
        CellValue::TimeSpan(value) => Some(*value),
        CellValue::Number(value) => from_days(*value),
        CellValue::DateTime(value) => Some(value.time() - NaiveTime::MIN),
        CellValue::Text(text) => {
            let text = text.trim();
            parse_clock_span(text)
                .or_else(|| text.parse::<f64>().ok().and_then(from_days))
                .or_else(|| parse_iso_duration(text))
        }
        _ => None,
    }
}

fn from_days(days: f64) -> Option<Duration> {
    if !days.is_finite() {
        return None;
    }
    let milliseconds = days * 86_400_000f64;
    if milliseconds.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(milliseconds.round() as i64)
}

fn parse_clock_span(text: &str) -> Option<Duration> {
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (head, tail) = text.split_once(':')?;
    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (days.parse::<u32>().ok()?, hours.parse::<u32>().ok()?),
        None => (0, head.parse::<u32>().ok()?),
    };
    let mut fields = tail.split(':');
    let minutes = fields.next()?.parse::<u32>().ok()?;
    let seconds = match fields.next() {
        Some(seconds) => seconds.parse::<f64>().ok()?,
        None => 0.0,
    };
    if fields.next().is_some() || hours > 23 || minutes > 59 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let whole = ((days as i64 * 24 + hours as i64) * 60 + minutes as i64) * 60_000;
    let milliseconds = whole + (seconds * 1000.0).round() as i64;
    Duration::try_milliseconds(if negative { -milliseconds } else { milliseconds })
}

/// Year and month components have no fixed length and are rejected.
fn parse_iso_duration(text: &str) -> Option<Duration> {
    let duration = text.parse::<IsoDuration>().ok()?;
    if duration.year != 0.0 || duration.month != 0.0 {
        return None;
    }
    let seconds = ((duration.day as f64 * 24.0 + duration.hour as f64) * 60.0 + duration.minute as f64) * 60.0
        + duration.second as f64;
    from_days(seconds / 86_400.0)
}
