use crate::convert::ConvertContext;
use crate::spreadsheet::cell::format_duration;
use crate::spreadsheet::cell::format_number;
use crate::spreadsheet::cell::CellValue;
use std::fmt::Write;
use std::net::IpAddr;
use url::Url;
use uuid::Uuid;

/// Converts any raw cell to its text form. Date/time cells honor the format hint.
/// NaN and infinities have no text form.
pub(crate) fn to_string(raw: &CellValue, context: &ConvertContext) -> Option<String> {
    let text = match raw {
        CellValue::Empty => return None,
        CellValue::Text(text) if context.trim => text.trim().to_owned(),
        CellValue::Text(text) => text.to_owned(),
        CellValue::Bool(value) => value.to_string(),
        CellValue::Number(value) if !value.is_finite() => return None,
        CellValue::Number(value) => format_number(*value),
        CellValue::DateTime(value) => {
            let mut text = String::new();
            let format = context.format.unwrap_or("%Y-%m-%d %H:%M:%S");
            if write!(text, "{}", value.format(format)).is_err() {
                // invalid strftime pattern
                text = value.format("%Y-%m-%d %H:%M:%S").to_string();
            }
            text
        }
        CellValue::TimeSpan(value) => format_duration(value),
    };
    Some(text)
}

/// Accepts hyphenated, simple, braced and URN forms.
pub(crate) fn to_uuid(raw: &CellValue) -> Option<Uuid> {
    Uuid::parse_str(raw.as_text()?.trim()).ok()
}

pub(crate) fn to_url(raw: &CellValue) -> Option<Url> {
    Url::parse(raw.as_text()?.trim()).ok()
}

pub(crate) fn to_ip_addr(raw: &CellValue) -> Option<IpAddr> {
    raw.as_text()?.trim().parse::<IpAddr>().ok()
}

/// Parses semantic versions; `major.minor` is completed with a zero patch.
pub(crate) fn to_version(raw: &CellValue) -> Option<semver::Version> {
    let text = raw.as_text()?.trim();
    let text = text.strip_prefix(['v', 'V']).unwrap_or(text);
    semver::Version::parse(text).ok().or_else(|| {
        let fields: Vec<&str> = text.split('.').collect();
        if fields.len() == 2 && fields.iter().all(|field| field.parse::<u64>().is_ok()) {
            semver::Version::parse(&format!("{}.0", text)).ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tests::context;
    use crate::convert::ConvertContext;
    use crate::convert::Culture;
    use crate::convert::EnumCache;
    use chrono::Duration;
    use chrono::NaiveDate;

    #[test]
    fn strings_from_cells() {
        let culture = Culture::invariant();
        let enums = EnumCache::new();
        let context = context(&culture, &enums);
        let datetime = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(7, 8, 9).unwrap();

        assert_eq!(to_string(&CellValue::from(" Ada "), &context).unwrap(), " Ada ");
        assert_eq!(to_string(&CellValue::Number(7.0), &context).unwrap(), "7");
        assert_eq!(to_string(&CellValue::Number(0.1), &context).unwrap(), "0.1");
        assert_eq!(to_string(&CellValue::Bool(false), &context).unwrap(), "false");
        assert_eq!(to_string(&CellValue::DateTime(datetime), &context).unwrap(), "2024-05-06 07:08:09");
        assert_eq!(to_string(&CellValue::TimeSpan(Duration::minutes(5)), &context).unwrap(), "00:05:00");
        assert_eq!(to_string(&CellValue::Number(f64::NAN), &context), None);
        assert_eq!(to_string(&CellValue::Number(f64::INFINITY), &context), None);
        assert_eq!(to_string(&CellValue::from("a\u{a0}b\u{3000}"), &context).unwrap(), "a\u{a0}b\u{3000}");

        let context = ConvertContext { trim: true, format: Some("%d/%m/%Y"), ..context };
        assert_eq!(to_string(&CellValue::from(" Ada "), &context).unwrap(), "Ada");
        assert_eq!(to_string(&CellValue::from("\u{a0}Ada\u{3000}"), &context).unwrap(), "Ada");
        assert_eq!(to_string(&CellValue::DateTime(datetime), &context).unwrap(), "06/05/2024");

        let context = ConvertContext { format: Some("%Q"), ..context };
        assert_eq!(to_string(&CellValue::DateTime(datetime), &context).unwrap(), "2024-05-06 07:08:09");
    }

    #[test]
    fn identifiers_from_text() {
        let uuid = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert_eq!(to_uuid(&CellValue::from(uuid)).unwrap().to_string(), uuid);
        assert_eq!(to_uuid(&CellValue::from("{67e55044-10b1-426f-9247-bb680e5fe0c8}")).unwrap().to_string(), uuid);
        assert!(to_uuid(&CellValue::from("not-a-uuid")).is_none());
        assert!(to_uuid(&CellValue::Number(1.0)).is_none());

        assert_eq!(to_url(&CellValue::from(" https://example.com/a ")).unwrap().host_str(), Some("example.com"));
        assert!(to_url(&CellValue::from("relative/path")).is_none());

        assert_eq!(to_ip_addr(&CellValue::from("10.0.0.1")).unwrap().to_string(), "10.0.0.1");
        assert!(to_ip_addr(&CellValue::from("::1")).unwrap().is_ipv6());
        assert!(to_ip_addr(&CellValue::from("300.1.1.1")).is_none());
    }

    #[test]
    fn versions_from_text() {
        assert_eq!(to_version(&CellValue::from("1.2.3")).unwrap().to_string(), "1.2.3");
        assert_eq!(to_version(&CellValue::from("v2.0.1-beta.1")).unwrap().to_string(), "2.0.1-beta.1");
        assert_eq!(to_version(&CellValue::from("1.2")).unwrap().to_string(), "1.2.0");
        assert!(to_version(&CellValue::from("1")).is_none());
        assert!(to_version(&CellValue::from("a.b")).is_none());
    }
}
