/// SAFE ledger: Checked Arithmetic Primitives
///
/// All quantities are 256-bit integers. Unsigned values use `U256`,
/// signed values use `I256` (range `[-2^255, 2^255 - 1]`).
/// Nothing here wraps: every operation returns `ArithmeticError` instead.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use thiserror::Error;

/// Largest magnitude of a non-negative `I256` (2^255 - 1).
const INT_MAX_MAGNITUDE: U256 = U256([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 1]);

/// Largest magnitude of a negative `I256` (2^255).
const INT_MIN_MAGNITUDE: U256 = U256([0, 0, 0, 1 << 63]);

/// Checked arithmetic failure. Overflow means the true result is above
/// the representable range, underflow that it is below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
}

/// Failure to parse a decimal literal into a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseScalarError {
    #[error("invalid decimal literal {0:?}")]
    Invalid(String),
    #[error("decimal literal out of range: {0}")]
    OutOfRange(#[from] ArithmeticError),
}

/// Signed 256-bit integer stored as sign and magnitude.
///
/// Zero is always non-negative, so derived equality is exact.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct I256 {
    negative: bool,
    magnitude: U256,
}

impl I256 {
    pub const ZERO: I256 = I256 {
        negative: false,
        magnitude: U256([0, 0, 0, 0]),
    };
    pub const MAX: I256 = I256 {
        negative: false,
        magnitude: INT_MAX_MAGNITUDE,
    };
    pub const MIN: I256 = I256 {
        negative: true,
        magnitude: INT_MIN_MAGNITUDE,
    };

    /// Build from sign and magnitude, rejecting values outside the signed range.
    pub fn from_parts(negative: bool, magnitude: U256) -> Result<Self, ArithmeticError> {
        if magnitude.is_zero() {
            return Ok(Self::ZERO);
        }
        if negative {
            if magnitude > INT_MIN_MAGNITUDE {
                return Err(ArithmeticError::Underflow);
            }
        } else if magnitude > INT_MAX_MAGNITUDE {
            return Err(ArithmeticError::Overflow);
        }
        Ok(Self { negative, magnitude })
    }

    /// Convert an unsigned value into the signed domain.
    pub fn try_from_unsigned(value: U256) -> Result<Self, ArithmeticError> {
        Self::from_parts(false, value)
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }

    /// Absolute value as an unsigned integer. Never fails: |MIN| fits in U256.
    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    pub fn checked_neg(self) -> Result<Self, ArithmeticError> {
        Self::from_parts(!self.negative, self.magnitude)
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self {
            negative: value < 0,
            magnitude: U256::from(value.unsigned_abs()),
        }
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from(value as i128)
    }
}

impl Ord for I256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
        }
    }
}

impl PartialOrd for I256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

impl fmt::Debug for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for I256 {
    type Err = ParseScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let magnitude = parse_unsigned(digits).map_err(|err| match err {
            ParseScalarError::Invalid(_) => ParseScalarError::Invalid(s.to_string()),
            other => other,
        })?;
        Ok(Self::from_parts(negative, magnitude)?)
    }
}

/// Parse a plain decimal literal (`[0-9]+`) into a `U256`.
pub fn parse_unsigned(s: &str) -> Result<U256, ParseScalarError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseScalarError::Invalid(s.to_string()));
    }
    U256::from_dec_str(s).map_err(|_| ParseScalarError::OutOfRange(ArithmeticError::Overflow))
}

// ---------------------------------------------------------------------------
// Unsigned-only
// ---------------------------------------------------------------------------

pub fn add_unsigned(x: U256, y: U256) -> Result<U256, ArithmeticError> {
    x.checked_add(y).ok_or(ArithmeticError::Overflow)
}

pub fn sub_unsigned(x: U256, y: U256) -> Result<U256, ArithmeticError> {
    x.checked_sub(y).ok_or(ArithmeticError::Underflow)
}

pub fn mul_unsigned(x: U256, y: U256) -> Result<U256, ArithmeticError> {
    x.checked_mul(y).ok_or(ArithmeticError::Overflow)
}

// ---------------------------------------------------------------------------
// Mixed signed / unsigned
// ---------------------------------------------------------------------------

/// `x + y` for unsigned `x`, signed `y`; the result must stay unsigned.
pub fn add(x: U256, y: I256) -> Result<U256, ArithmeticError> {
    if y.negative {
        sub_unsigned(x, y.magnitude)
    } else {
        add_unsigned(x, y.magnitude)
    }
}

/// `x - y` for unsigned `x`, signed `y`; the result must stay unsigned.
pub fn sub(x: U256, y: I256) -> Result<U256, ArithmeticError> {
    if y.negative {
        add_unsigned(x, y.magnitude)
    } else {
        sub_unsigned(x, y.magnitude)
    }
}

/// `x * y` for unsigned `x`, signed `y`. Fails if `x` itself is
/// outside the signed domain, even when `y` is zero.
pub fn mul(x: U256, y: I256) -> Result<I256, ArithmeticError> {
    if x > INT_MAX_MAGNITUDE {
        return Err(ArithmeticError::Overflow);
    }
    let magnitude = x.checked_mul(y.magnitude).ok_or(if y.negative {
        ArithmeticError::Underflow
    } else {
        ArithmeticError::Overflow
    })?;
    I256::from_parts(y.negative, magnitude)
}

pub fn add_signed(x: I256, y: I256) -> Result<I256, ArithmeticError> {
    add_parts(x.negative, x.magnitude, y.negative, y.magnitude)
}

pub fn sub_signed(x: I256, y: I256) -> Result<I256, ArithmeticError> {
    // Negating `y` in place keeps `x - MIN` representable when `x < 0`.
    add_parts(x.negative, x.magnitude, !y.negative && !y.is_zero(), y.magnitude)
}

fn add_parts(
    a_negative: bool,
    a_magnitude: U256,
    b_negative: bool,
    b_magnitude: U256,
) -> Result<I256, ArithmeticError> {
    if a_negative == b_negative {
        let magnitude = a_magnitude.checked_add(b_magnitude).ok_or(if a_negative {
            ArithmeticError::Underflow
        } else {
            ArithmeticError::Overflow
        })?;
        return I256::from_parts(a_negative, magnitude);
    }
    if a_magnitude >= b_magnitude {
        I256::from_parts(a_negative, a_magnitude - b_magnitude)
    } else {
        I256::from_parts(b_negative, b_magnitude - a_magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i128) -> I256 {
        I256::from(v)
    }

    #[test]
    fn test_add_mixed_ok() {
        assert_eq!(add(U256::from(10u64), int(-4)), Ok(U256::from(6u64)));
        assert_eq!(add(U256::from(10u64), int(5)), Ok(U256::from(15u64)));
        assert_eq!(add(U256::zero(), I256::ZERO), Ok(U256::zero()));
    }

    #[test]
    fn test_add_mixed_rejects_negative_result() {
        assert_eq!(add(U256::from(3u64), int(-4)), Err(ArithmeticError::Underflow));
    }

    #[test]
    fn test_add_mixed_rejects_wrap() {
        assert_eq!(add(U256::MAX, int(1)), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn test_sub_mixed() {
        assert_eq!(sub(U256::from(10u64), int(4)), Ok(U256::from(6u64)));
        assert_eq!(sub(U256::from(10u64), int(-4)), Ok(U256::from(14u64)));
        assert_eq!(sub(U256::zero(), int(1)), Err(ArithmeticError::Underflow));
        assert_eq!(sub(U256::MAX, int(-1)), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn test_mul_mixed() {
        assert_eq!(mul(U256::from(6u64), int(-7)), Ok(int(-42)));
        assert_eq!(mul(U256::from(6u64), int(7)), Ok(int(42)));
        assert_eq!(mul(U256::zero(), int(-7)), Ok(I256::ZERO));
    }

    #[test]
    fn test_mul_requires_signed_domain_operand() {
        let too_big = INT_MAX_MAGNITUDE + U256::one();
        assert_eq!(mul(too_big, I256::ZERO), Err(ArithmeticError::Overflow));
        assert_eq!(mul(INT_MAX_MAGNITUDE, int(1)), Ok(I256::MAX));
    }

    #[test]
    fn test_mul_mixed_out_of_range() {
        assert_eq!(mul(INT_MAX_MAGNITUDE, int(2)), Err(ArithmeticError::Overflow));
        assert_eq!(mul(INT_MAX_MAGNITUDE, int(-2)), Err(ArithmeticError::Underflow));
        // -1 * (2^255 - 1) is fine, and so is reaching MIN exactly.
        assert!(mul(INT_MAX_MAGNITUDE, int(-1)).is_ok());
    }

    #[test]
    fn test_signed_add_sub() {
        assert_eq!(add_signed(int(-5), int(3)), Ok(int(-2)));
        assert_eq!(add_signed(int(5), int(-5)), Ok(I256::ZERO));
        assert_eq!(sub_signed(int(-5), int(-5)), Ok(I256::ZERO));
        assert_eq!(sub_signed(int(3), int(10)), Ok(int(-7)));
        assert_eq!(add_signed(I256::MAX, int(1)), Err(ArithmeticError::Overflow));
        assert_eq!(add_signed(I256::MIN, int(-1)), Err(ArithmeticError::Underflow));
        assert_eq!(add_signed(I256::MIN, I256::MIN), Err(ArithmeticError::Underflow));
        assert_eq!(sub_signed(int(-1), I256::MIN), Ok(I256::MAX));
        assert_eq!(sub_signed(int(0), I256::MIN), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn test_unsigned_only() {
        assert_eq!(add_unsigned(U256::MAX, U256::one()), Err(ArithmeticError::Overflow));
        assert_eq!(sub_unsigned(U256::zero(), U256::one()), Err(ArithmeticError::Underflow));
        assert_eq!(mul_unsigned(U256::MAX, U256::from(2u64)), Err(ArithmeticError::Overflow));
        assert_eq!(mul_unsigned(U256::from(3u64), U256::from(4u64)), Ok(U256::from(12u64)));
    }

    #[test]
    fn test_ordering_and_zero_sign() {
        assert!(int(-3) < int(-2));
        assert!(int(-1) < I256::ZERO);
        assert!(I256::MIN < I256::MAX);
        assert_eq!(I256::from_parts(true, U256::zero()), Ok(I256::ZERO));
        assert!(!I256::ZERO.is_negative());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("-42".parse::<I256>(), Ok(int(-42)));
        assert_eq!(int(-42).to_string(), "-42");
        assert_eq!(I256::MIN.to_string().parse::<I256>(), Ok(I256::MIN));
        assert!(matches!("4x".parse::<I256>(), Err(ParseScalarError::Invalid(_))));
        assert!(matches!("".parse::<I256>(), Err(ParseScalarError::Invalid(_))));
        assert_eq!(
            (I256::MAX.magnitude() + U256::one()).to_string().parse::<I256>(),
            Err(ParseScalarError::OutOfRange(ArithmeticError::Overflow))
        );
    }
}
