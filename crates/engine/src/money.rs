use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

use crate::LedgerError;

const MINOR_PER_UNIT: i64 = 100;

/// Signed money amount represented as an integer number of **hundredths**.
///
/// Use this type for every monetary value in the ledger (record amounts,
/// totals, balances) so sums never drift.
///
/// Chat input is always whole units: `.` and `,` are digit-group separators
/// and are dropped (see [`Amount::parse_grouped`]). Stored rows go through
/// [`FromStr`], which also accepts up to two fractional digits so a sheet
/// edited by hand still reads back.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount = Amount::parse_grouped("5.000.000").unwrap();
/// assert_eq!(amount, Amount::from_units(5_000_000));
/// assert_eq!(amount.to_string(), "5000000");
///
/// assert_eq!("12.5".parse::<Amount>().unwrap().minor(), 1250);
/// assert!("12.345".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Creates a new amount from hundredths.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates a new amount from whole units.
    ///
    /// Saturates on overflow; use [`Amount::parse_grouped`] for user input.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(MINOR_PER_UNIT))
    }

    /// Returns the raw value in hundredths.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parses a chat amount such as `50000`, `50.000` or `1,500,000`.
    ///
    /// Grouping separators are stripped before parsing, so `1.5` means
    /// fifteen units. Negative, empty and non-numeric inputs are rejected.
    pub fn parse_grouped(input: &str) -> Result<Self, LedgerError> {
        let invalid = || LedgerError::InvalidAmount(format!("\"{input}\" is not a number"));

        let stripped: String = input
            .trim()
            .chars()
            .filter(|c| *c != '.' && *c != ',')
            .collect();
        if stripped.starts_with('-') {
            return Err(LedgerError::InvalidAmount(format!(
                "\"{input}\" is negative"
            )));
        }

        let digits = stripped.strip_prefix('+').unwrap_or(&stripped);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = digits.parse().map_err(|_| invalid())?;
        units
            .checked_mul(MINOR_PER_UNIT)
            .map(Amount)
            .ok_or_else(|| LedgerError::InvalidAmount("amount too large".to_string()))
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Whole-unit part and the two fractional digits, without sign.
    #[must_use]
    pub fn split_abs(self) -> (u64, u64) {
        let abs = self.0.unsigned_abs();
        let minor = MINOR_PER_UNIT.unsigned_abs();
        (abs / minor, abs % minor)
    }
}

/// Plain decimal form used in storage: `5000000`, `12.5`, `12.05`, `-3`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let (units, frac) = self.split_abs();
        match frac {
            0 => write!(f, "{sign}{units}"),
            frac if frac % 10 == 0 => write!(f, "{sign}{units}.{}", frac / 10),
            frac => write!(f, "{sign}{units}.{frac:02}"),
        }
    }
}

/// Operators saturate at the `i64` bounds. Totals that must not clamp use
/// [`Amount::checked_add`].
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(self.0.saturating_neg())
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses a stored decimal string.
    ///
    /// Accepts `.` as decimal separator and an optional leading `+`/`-`.
    /// At most 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidAmount(format!("invalid amount \"{s}\""));
        let overflow = || LedgerError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, trimmed.strip_prefix('+').unwrap_or(trimmed))
        };

        let (units_str, frac_str) = match rest.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (rest, ""),
        };
        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;
        let frac: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => frac_str.parse::<i64>().map_err(|_| invalid())?,
            _ => return Err(LedgerError::InvalidAmount("too many decimals".to_string())),
        };

        let total = units
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(overflow)?;

        Ok(Amount(if negative { -total } else { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_input_strips_separators() {
        assert_eq!(
            Amount::parse_grouped("5000000").unwrap(),
            Amount::from_units(5_000_000)
        );
        assert_eq!(
            Amount::parse_grouped("5.000.000").unwrap(),
            Amount::from_units(5_000_000)
        );
        assert_eq!(
            Amount::parse_grouped("1,500,000").unwrap(),
            Amount::from_units(1_500_000)
        );
        assert_eq!(Amount::parse_grouped("1.5").unwrap(), Amount::from_units(15));
        assert_eq!(Amount::parse_grouped("+20").unwrap(), Amount::from_units(20));
        assert_eq!(Amount::parse_grouped("0").unwrap(), Amount::ZERO);
    }

    #[test]
    fn grouped_input_rejects_garbage_and_negatives() {
        assert!(Amount::parse_grouped("").is_err());
        assert!(Amount::parse_grouped("abc").is_err());
        assert!(Amount::parse_grouped("12k").is_err());
        assert!(Amount::parse_grouped("-5000").is_err());
        assert!(Amount::parse_grouped(".,").is_err());
        assert!(Amount::parse_grouped("99999999999999999999").is_err());
    }

    #[test]
    fn display_is_the_shortest_plain_decimal() {
        assert_eq!(Amount::from_minor(0).to_string(), "0");
        assert_eq!(Amount::from_units(5_000_000).to_string(), "5000000");
        assert_eq!(Amount::from_minor(1250).to_string(), "12.5");
        assert_eq!(Amount::from_minor(1205).to_string(), "12.05");
        assert_eq!(Amount::from_minor(-300).to_string(), "-3");
    }

    #[test]
    fn stored_values_parse_back() {
        assert_eq!("5000000".parse::<Amount>().unwrap(), Amount::from_units(5_000_000));
        assert_eq!("12.50".parse::<Amount>().unwrap().minor(), 1250);
        assert_eq!(" 7 ".parse::<Amount>().unwrap().minor(), 700);
        assert_eq!("-0.01".parse::<Amount>().unwrap().minor(), -1);
        assert!("12.345".parse::<Amount>().is_err());
        assert!("1.2.3".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
        assert!("NaN".parse::<Amount>().is_err());
    }

    #[test]
    fn sum_adds_minor_units() {
        let total: Amount = [Amount::from_minor(150), Amount::from_minor(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Amount::from_minor(400));
    }

    #[test]
    fn checked_add_reports_overflow() {
        let big = Amount::parse_grouped("90000000000000000").unwrap();
        assert_eq!(big.checked_add(big), None);
        assert_eq!(
            Amount::from_minor(1).checked_add(Amount::from_minor(2)),
            Some(Amount::from_minor(3))
        );
        assert_eq!(Amount::from_minor(i64::MIN).checked_sub(Amount::from_minor(1)), None);
    }

    #[test]
    fn operators_saturate_instead_of_wrapping() {
        let big = Amount::from_minor(i64::MAX - 1);
        assert_eq!(big + Amount::from_minor(10), Amount::from_minor(i64::MAX));
        assert_eq!(-Amount::from_minor(i64::MIN), Amount::from_minor(i64::MAX));
    }
}
