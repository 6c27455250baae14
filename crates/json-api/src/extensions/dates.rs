//! Calendar date parsing for request bodies and query strings.

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use salvo::oapi::extract::QueryParam;

use crate::{envelope::ApiError, extensions::*};

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into its UTC calendar date.
pub(crate) fn parse_date(value: &str) -> Option<Date> {
    let value = value.trim();

    // Offsets must win over the plain-date reading, which ignores them.
    value
        .parse::<Timestamp>()
        .map(|ts| ts.to_zoned(TimeZone::UTC).date())
        .or_else(|_| value.parse::<Date>())
        .ok()
}

pub(crate) trait DateQueryExt {
    /// The optional `date` filter of listing endpoints.
    fn into_date(self) -> Result<Option<Date>, ApiError>;
}

impl DateQueryExt for QueryParam<String, false> {
    fn into_date(self) -> Result<Option<Date>, ApiError> {
        self.into_inner()
            .map(|value| parse_date(&value).ok_or(value))
            .transpose()
            .or_400("date must be formatted as YYYY-MM-DD")
    }
}
