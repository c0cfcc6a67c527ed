//! Monetary amounts.
//!
//! Amounts are exact decimals with two fractional digits. They are stored in
//! the database as integer cents so that sums computed by SQLite are exact.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::Error;

/// The number of fractional digits kept for amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// The smallest valid amount in cents, i.e. 0.01.
const MIN_CENTS: i64 = 1;

/// The largest valid amount in cents, i.e. 999,999,999.99.
const MAX_CENTS: i64 = 99_999_999_999;

/// Convert a sum of cents into a decimal with [CURRENCY_SCALE] fractional digits.
pub(crate) fn decimal_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CURRENCY_SCALE)
}

/// The amount of money moved by a single transaction.
///
/// Always positive; whether the money came in or went out is recorded by the
/// transaction's type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Amount {
    /// Create an amount, rounding `value` to two decimal places (half away
    /// from zero).
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is not between 0.01 and
    /// 999,999,999.99 inclusive. The bounds are checked before rounding.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value < decimal_from_cents(MIN_CENTS) || value > decimal_from_cents(MAX_CENTS) {
            return Err(Error::InvalidAmount(value));
        }

        let mut amount =
            value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(CURRENCY_SCALE);

        Ok(Self(amount))
    }

    /// Create an amount from a number of cents without validation.
    ///
    /// The caller should ensure that `cents` is in the valid range.
    pub fn from_cents_unchecked(cents: i64) -> Self {
        Self(decimal_from_cents(cents))
    }

    /// The amount as a decimal number.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The amount in cents.
    pub fn cents(&self) -> i64 {
        // The scale is fixed by the constructors and the mantissa is bounded
        // by MAX_CENTS, so the conversion cannot truncate.
        self.0.mantissa() as i64
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self::from_cents_unchecked)
    }
}
