use chrono::{DateTime, NaiveDateTime, Utc};

/// Find the first `YYYYMMDD_HHMMSS` or `YYMMDD_HHMMSS` token in `name`.
/// At each position the long form is tried before the short one.
fn find_token(name: &str) -> Option<(&str, &'static str)> {
    let b = name.as_bytes();
    (0..b.len()).find_map(|i| {
        if digits_underscore_digits(b, i, 8) {
            Some((&name[i..i + 15], "%Y%m%d_%H%M%S"))
        } else if digits_underscore_digits(b, i, 6) {
            Some((&name[i..i + 13], "%y%m%d_%H%M%S"))
        } else {
            None
        }
    })
}

fn digits_underscore_digits(b: &[u8], start: usize, date_len: usize) -> bool {
    let end = start + date_len + 7;
    end <= b.len()
        && b[start..start + date_len].iter().all(u8::is_ascii_digit)
        && b[start + date_len] == b'_'
        && b[start + date_len + 1..end].iter().all(u8::is_ascii_digit)
}

/// The recording time embedded in a file name, read as UTC.
///
/// Only the first token is considered; if it is not a valid calendar time
/// the name carries no timestamp.
pub fn parse_time_from_filename(name: &str) -> Option<DateTime<Utc>> {
    let (token, fmt) = find_token(name)?;
    NaiveDateTime::parse_from_str(token, fmt)
        .ok()
        .map(|t| t.and_utc())
}

/// A file name timestamp wins over the file's creation time.
pub fn resolve_recorded_at(file_name: &str, created: DateTime<Utc>) -> DateTime<Utc> {
    parse_time_from_filename(file_name).unwrap_or(created)
}
