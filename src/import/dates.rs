//! Excel serial date conversion and age arithmetic.

use chrono::{Datelike, Days, NaiveDate};

/// Convert an Excel serial date number to a calendar date
///
/// Spreadsheets store dates as days counted from the 1900 epoch, and Excel
/// famously counts the nonexistent 1900-02-29; for the post-1900 dates found
/// in course rosters the correct conversion is epoch plus serial minus two
/// days. A fractional part encodes time of day and is ignored here.
///
/// Returns `None` for negative, non-finite, or out-of-range serials.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 2.0 {
        return None;
    }

    let days = serial.trunc() as u64 - 2;
    NaiveDate::from_ymd_opt(1900, 1, 1).and_then(|epoch| epoch.checked_add_days(Days::new(days)))
}

/// Age in whole years on a given day
///
/// Counts completed years, i.e. the year difference minus one when the
/// birthday has not yet occurred in `on`'s year.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}
