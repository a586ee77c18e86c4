use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Timelike;

/// Order of the day, month and year fields in a culture's short date.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DateOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

/// Number and date conventions used when parsing text cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Culture {
    pub name: String,
    pub decimal_separator: char,
    pub group_separator: char,
    pub date_order: DateOrder,
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Culture {
    pub fn new(name: &str, decimal_separator: char, group_separator: char, date_order: DateOrder) -> Self {
        Self {
            name: name.to_owned(),
            decimal_separator,
            group_separator,
            date_order,
        }
    }

    /// Culture-neutral conventions: `1,234.5` and `MM/dd/yyyy`.
    pub fn invariant() -> Self {
        Self::new("", '.', ',', DateOrder::MonthDayYear)
    }

    pub fn en_us() -> Self {
        Self::new("en-US", '.', ',', DateOrder::MonthDayYear)
    }

    pub fn de_de() -> Self {
        Self::new("de-DE", ',', '.', DateOrder::DayMonthYear)
    }

    pub fn fr_fr() -> Self {
        Self::new("fr-FR", ',', '\u{202f}', DateOrder::DayMonthYear)
    }

    pub fn zh_cn() -> Self {
        Self::new("zh-CN", '.', ',', DateOrder::YearMonthDay)
    }

    /// Looks up a preset by name (case-insensitive). Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" | "invariant" => Some(Self::invariant()),
            "en-us" => Some(Self::en_us()),
            "de-de" => Some(Self::de_de()),
            "fr-fr" => Some(Self::fr_fr()),
            "zh-cn" => Some(Self::zh_cn()),
            _ => None,
        }
    }

    pub fn is_invariant(&self) -> bool {
        *self == Self::invariant()
    }

    /// Parses a number written with this culture's separators.
    /// Non-finite results are rejected.
    pub fn parse_number(&self, text: &str) -> Option<f64> {
        self.normalize_number(text)?
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    /// Rewrites a number in invariant notation: group separators dropped,
    /// `.` as the decimal point. Other characters reject the text.
    pub fn normalize_number(&self, text: &str) -> Option<String> {
        let mut normalized = String::with_capacity(text.len());
        for character in text.trim().chars() {
            match character {
                c if c == self.group_separator => (),
                c if c.is_whitespace() && self.group_separator.is_whitespace() => (),
                c if c == self.decimal_separator => normalized.push('.'),
                c @ ('0'..='9' | '+' | '-' | 'e' | 'E') => normalized.push(c),
                _ => return None,
            }
        }
        Some(normalized)
    }

    /// Parses a short date with an optional time part, e.g. `31.12.2024 13:05`.
    pub fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        let (date_part, time_part) = match text.split_once(|c: char| c.is_whitespace() || c == 'T') {
            Some((date, time)) => (date, Some(time.trim())),
            None => (text, None),
        };
        let date = self.parse_date(date_part)?;
        let time = match time_part {
            Some(time) if !time.is_empty() => parse_clock(time)?,
            _ => NaiveTime::MIN,
        };
        Some(date.and_time(time))
    }

    fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let fields: Vec<&str> = text.split(['/', '-', '.']).collect();
        if fields.len() != 3 || fields.iter().any(|field| field.is_empty() || field.len() > 4) {
            return None;
        }
        let numbers: Vec<u32> = fields
            .iter()
            .map(|field| field.parse::<u32>().ok())
            .collect::<Option<Vec<u32>>>()?;
        let (year, month, day) = match self.date_order {
            DateOrder::MonthDayYear => ((fields[2], numbers[2]), numbers[0], numbers[1]),
            DateOrder::DayMonthYear => ((fields[2], numbers[2]), numbers[1], numbers[0]),
            DateOrder::YearMonthDay => ((fields[0], numbers[0]), numbers[1], numbers[2]),
        };
        NaiveDate::from_ymd_opt(expand_year(year.0, year.1)?, month, day)
    }
}

/// Expands two-digit years: `00..=49` map to 2000s, `50..=99` to 1900s.
fn expand_year(text: &str, year: u32) -> Option<i32> {
    match text.len() {
        1 | 2 if year < 50 => Some(2000 + year as i32),
        1 | 2 => Some(1900 + year as i32),
        4 => Some(year as i32),
        _ => None,
    }
}

/// Parses `H:mm[:ss[.fff]]` with an optional `AM`/`PM` designator.
pub(crate) fn parse_clock(text: &str) -> Option<NaiveTime> {
    let upper = text.trim().to_ascii_uppercase();
    let (clock, meridiem) = if let Some(clock) = upper.strip_suffix("AM") {
        (clock.trim(), Some(false))
    } else if let Some(clock) = upper.strip_suffix("PM") {
        (clock.trim(), Some(true))
    } else {
        (upper.as_str(), None)
    };
    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .ok()?;
    match meridiem {
        None => Some(time),
        Some(is_pm) => {
            let hour = time.hour();
            if hour == 0 || hour > 12 {
                return None;
            }
            let hour = hour % 12 + if is_pm { 12 } else { 0 };
            NaiveTime::from_hms_nano_opt(hour, time.minute(), time.second(), time.nanosecond())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numbers_with_separators() {
        assert_eq!(Culture::invariant().parse_number("1,234.5"), Some(1234.5));
        assert_eq!(Culture::de_de().parse_number("1.234,5"), Some(1234.5));
        assert_eq!(Culture::fr_fr().parse_number("1 234,5"), Some(1234.5));
        assert_eq!(Culture::invariant().parse_number("-2.5e3"), Some(-2500.0));
        assert_eq!(Culture::invariant().parse_number("12abc"), None);
        assert_eq!(Culture::invariant().parse_number("NaN"), None);
        assert_eq!(Culture::invariant().parse_number(""), None);
    }

    #[test]
    fn parse_dates_by_order() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Culture::en_us().parse_datetime("3/9/2024"), Some(expected));
        assert_eq!(Culture::de_de().parse_datetime("09.03.2024"), Some(expected));
        assert_eq!(Culture::zh_cn().parse_datetime("2024/3/9"), Some(expected));
        assert_eq!(Culture::de_de().parse_datetime("09.03.24"), Some(expected));
        assert_eq!(Culture::en_us().parse_datetime("13/9/2024"), None);
    }

    #[test]
    fn parse_dates_with_time() {
        let value = Culture::en_us().parse_datetime("3/9/2024 1:05 PM").unwrap();
        assert_eq!(value.to_string(), "2024-03-09 13:05:00");
        let value = Culture::de_de().parse_datetime("09.03.2024 13:05:30").unwrap();
        assert_eq!(value.to_string(), "2024-03-09 13:05:30");
        assert_eq!(parse_clock("12:30 AM").unwrap().to_string(), "00:30:00");
        assert_eq!(parse_clock("12:30 PM").unwrap().to_string(), "12:30:00");
        assert!(parse_clock("13:30 PM").is_none());
    }

    #[test]
    fn parse_dates_with_unicode_separators() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(Culture::en_us().parse_datetime("1/2/2024\u{a0}10:00"), Some(expected));
        assert_eq!(Culture::en_us().parse_datetime("1/2/2024\u{3000}10:00"), Some(expected));
        assert_eq!(Culture::en_us().parse_datetime("1/2/2024\u{202f}10:00"), Some(expected));
        assert_eq!(Culture::de_de().parse_datetime("\u{a0}02.01.2024\u{a0}"), Some(expected.date().and_hms_opt(0, 0, 0).unwrap()));
        assert_eq!(Culture::en_us().parse_datetime("1/2/2024\u{a0}\u{a0}"), Some(expected.date().and_hms_opt(0, 0, 0).unwrap()));
        assert_eq!(Culture::en_us().parse_datetime("\u{a0}"), None);
    }

    #[test]
    fn parse_numbers_with_unicode_spaces() {
        assert_eq!(Culture::fr_fr().parse_number("1\u{202f}234,5"), Some(1234.5));
        assert_eq!(Culture::fr_fr().parse_number("1\u{a0}234,5"), Some(1234.5));
        assert_eq!(Culture::invariant().parse_number("\u{3000}42\u{3000}"), Some(42.0));
        assert_eq!(Culture::invariant().parse_number("4\u{a0}2"), None);
    }

    #[test]
    fn culture_lookup() {
        assert_eq!(Culture::from_name("DE-de"), Some(Culture::de_de()));
        assert!(Culture::from_name("").unwrap().is_invariant());
        assert!(Culture::from_name("xx-YY").is_none());
    }
}
