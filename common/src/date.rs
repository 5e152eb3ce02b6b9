//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData, str::FromStr};

use derive_more::Debug;
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::well_known::Iso8601, util, Month};

#[cfg(doc)]
use crate::DateTime;

/// Untyped calendar date.
pub type Date = DateOf;

/// Calendar date without a time zone.
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Returns the current UTC [`Date`].
    #[must_use]
    pub fn today() -> Self {
        time::OffsetDateTime::now_utc().date().into()
    }

    /// Creates a new [`Date`] from the provided [ISO 8601] `YYYY-MM-DD`
    /// string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid calendar date.
    ///
    /// [ISO 8601]: https://en.wikipedia.org/wiki/ISO_8601
    pub fn from_iso8601(input: &str) -> Result<Self, time::error::Parse> {
        time::Date::parse(input, &Iso8601::DATE).map(Into::into)
    }

    /// Returns a [`Date`] being the given number of `days` apart.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.inner
            .checked_add(time::Duration::days(days))
            .map(Into::into)
    }

    /// Returns a [`Date`] being the given number of `months` later.
    ///
    /// The day of month is clamped to the length of the resulting month, so
    /// `2024-01-31` plus one month is `2024-02-29`.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_add_months(self, months: u32) -> Option<Self> {
        let total = i64::from(self.inner.year()) * 12
            + i64::from(u8::from(self.inner.month()) - 1)
            + i64::from(months);
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month = u8::try_from(total.rem_euclid(12) + 1).ok()?;
        let month = Month::try_from(month).ok()?;
        let day = self.inner.day().min(util::days_in_year_month(year, month));
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Into::into)
    }

    /// Returns the number of whole days from the `earlier` [`Date`] to this
    /// one.
    ///
    /// The result is negative if `earlier` is actually later.
    #[must_use]
    pub fn days_since<Other: ?Sized>(&self, earlier: DateOf<Other>) -> i64 {
        (self.inner - earlier.inner).whole_days()
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(date: DateOf<Of>) -> Self {
        date.inner
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.inner.year(),
            u8::from(self.inner.month()),
            self.inner.day(),
        )
    }
}

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iso8601(s).map_err(|_| "invalid `Date`")
    }
}

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Into::into)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in a `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = crate::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_iso8601(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Date;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!(date("2024-01-08").to_string(), "2024-01-08");
        assert!("2024-13-01".parse::<Date>().is_err());
        assert!("08.01.2024".parse::<Date>().is_err());
    }

    #[test]
    fn adds_days() {
        assert_eq!(
            date("2024-01-01").checked_add_days(7),
            Some(date("2024-01-08")),
        );
        assert_eq!(
            date("2024-02-28").checked_add_days(1),
            Some(date("2024-02-29")),
        );
        assert_eq!(
            date("2024-01-08").checked_add_days(-7),
            Some(date("2024-01-01")),
        );
    }

    #[test]
    fn adds_months_clamping_day() {
        assert_eq!(
            date("2024-01-15").checked_add_months(3),
            Some(date("2024-04-15")),
        );
        assert_eq!(
            date("2024-11-30").checked_add_months(3),
            Some(date("2025-02-28")),
        );
        assert_eq!(
            date("2024-01-31").checked_add_months(1),
            Some(date("2024-02-29")),
        );
    }

    #[test]
    fn counts_days_between() {
        assert_eq!(date("2024-01-15").days_since(date("2024-01-01")), 14);
        assert_eq!(date("2024-01-01").days_since(date("2024-01-15")), -14);
        assert_eq!(date("2024-01-01").days_since(date("2024-01-01")), 0);
    }
}
