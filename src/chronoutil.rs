use {
    crate::constants::HDR_DATE,
    chrono::{
        offset::{FixedOffset, TimeZone},
        DateTime, NaiveDate, Utc,
    },
    lazy_static::lazy_static,
    regex::Regex,
    std::str::FromStr,
};

/// Compact ISO 8601 timestamp format used in the string to sign and date headers.
pub(crate) const ISO8601_COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Date format used in credential scopes.
pub(crate) const ISO8601_DATE_FORMAT: &str = "%Y%m%d";

/// RFC 1123 format used when the date header is `Date`.
pub(crate) const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

lazy_static! {
    /// ISO 8601 timestamp format, basic or extended.
    static ref ISO_8601_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})-?
        (?P<month>0[1-9]|1[0-2])-?
        (?P<day>0[1-9]|[12][0-9]|3[01])
        T
        (?P<hour>[01][0-9]|2[0-3]):?
        (?P<minute>[0-5][0-9]):?
        (?P<second>[0-5][0-9])
        (?P<offset>[-+][01][0-9]:?[0-5][0-9]|Z)$").expect("invalid ISO 8601 regex");
}

/// Format a timestamp in the compact ISO 8601 form, e.g. `20110909T233600Z`.
#[inline]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(ISO8601_COMPACT_FORMAT).to_string()
}

/// Format the date portion of a timestamp for a credential scope, e.g. `20110909`.
#[inline]
pub fn format_date(date: &NaiveDate) -> String {
    date.format(ISO8601_DATE_FORMAT).to_string()
}

/// Format a timestamp for the given date header. The `Date` header takes an RFC 1123 date; every
/// other header takes the compact ISO 8601 form.
pub fn format_date_header(date_header_name: &str, ts: &DateTime<Utc>) -> String {
    if date_header_name.eq_ignore_ascii_case(HDR_DATE) {
        ts.format(RFC1123_FORMAT).to_string()
    } else {
        format_timestamp(ts)
    }
}

/// Parse a timestamp from a date header or query parameter.
///
/// Accepts ISO 8601 in basic (`20110909T233600Z`) or extended (`2011-09-09T23:36:00+00:00`) form and
/// RFC 2822 / RFC 1123 dates (`Fri, 09 Sep 2011 23:36:00 GMT`). Returns `None` if the value is in none
/// of these forms.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Some(ts) = parse_iso8601(s) {
        return Some(ts);
    }

    DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.with_timezone(&Utc))
}

fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    let cap = ISO_8601_REGEX.captures(s)?;
    let field = |name: &str| -> Option<u32> { u32::from_str(cap.name(name)?.as_str()).ok() };

    let year = i32::from_str(cap.name("year")?.as_str()).ok()?;
    let date = NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)?;
    let naive = date.and_hms_opt(field("hour")?, field("minute")?, field("second")?)?;

    let offset_str = cap.name("offset")?.as_str();
    let offset_secs = if offset_str == "Z" {
        0
    } else {
        let condensed = offset_str.replace(':', "");
        let (sign, hm) = condensed.split_at(1);
        let (hours, minutes) = hm.split_at(2);
        let secs = i32::from_str(hours).ok()? * 3600 + i32::from_str(minutes).ok()? * 60;
        if sign == "-" {
            -secs
        } else {
            secs
        }
    };

    let offset = FixedOffset::east_opt(offset_secs)?;
    offset.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc))
}
