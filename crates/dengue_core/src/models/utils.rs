/// Decodes a Latin-1 (ISO-8859-1) byte buffer into a UTF-8 `String`.
///
/// SINAN extracts ship in Latin-1; every byte maps directly to the
/// Unicode code point of the same value, so the conversion is total and
/// never fails.
///
/// # Example
/// ```rust
/// use dengue_core::models::utils::decode_latin1;
///
/// assert_eq!(decode_latin1(b"S\xe3o Paulo"), "São Paulo");
/// assert_eq!(decode_latin1(b"dengue"), "dengue");
/// ```
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Converts a polars Date physical value (days since 1970-01-01) to a
/// [`chrono::NaiveDate`]. `None` only for values outside chrono's range.
pub fn date_from_days(days: i32) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
}

/// Converts a [`chrono::NaiveDate`] to days since 1970-01-01, the
/// physical representation of the polars Date dtype.
pub fn days_from_date(date: chrono::NaiveDate) -> i32 {
    chrono::Datelike::num_days_from_ce(&date) - EPOCH_DAYS_FROM_CE
}

// 1970-01-01 in chrono's days-from-CE reckoning.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;
