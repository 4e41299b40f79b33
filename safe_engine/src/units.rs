/// SAFE ledger: Fixed-Point Scalars
///
/// One unsigned type and one signed delta type per scale:
///   wad = 10^18 (collateral, nominal debt)
///   ray = 10^27 (rates, prices)
///   rad = 10^45 (wad * ray; coin and debt balances)
///
/// Raw integer values are stored unscaled; `Wad::from_units(1)` holds 10^18.
/// Scales only meet through the explicit wad x ray products below, whose raw
/// product is already rad-scaled.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::arithmetic::{self, parse_unsigned, ArithmeticError, ParseScalarError, I256};

/// A decimal fixed-point scale.
pub trait Scale: Copy + Default + 'static {
    const DECIMALS: usize;
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WadScale;

#[derive(Debug, Clone, Copy, Default)]
pub struct RayScale;

#[derive(Debug, Clone, Copy, Default)]
pub struct RadScale;

/// Unscaled integer; used for parameter values whose scale depends on the
/// parameter name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawScale;

impl Scale for WadScale {
    const DECIMALS: usize = 18;
    const NAME: &'static str = "wad";
}

impl Scale for RayScale {
    const DECIMALS: usize = 27;
    const NAME: &'static str = "ray";
}

impl Scale for RadScale {
    const DECIMALS: usize = 45;
    const NAME: &'static str = "rad";
}

impl Scale for RawScale {
    const DECIMALS: usize = 0;
    const NAME: &'static str = "raw";
}

pub type Wad = Amount<WadScale>;
pub type Ray = Amount<RayScale>;
pub type Rad = Amount<RadScale>;
pub type Raw = Amount<RawScale>;

pub type WadDelta = Delta<WadScale>;
pub type RayDelta = Delta<RayScale>;
pub type RadDelta = Delta<RadScale>;

// ── Amount ─────────────────────────────────────────────────────────

/// Non-negative scaled quantity.
#[derive(Clone, Copy, Default)]
pub struct Amount<S: Scale> {
    value: U256,
    scale: PhantomData<S>,
}

impl<S: Scale> Amount<S> {
    pub const ZERO: Self = Self {
        value: U256([0, 0, 0, 0]),
        scale: PhantomData,
    };
    pub const MAX: Self = Self {
        value: U256::MAX,
        scale: PhantomData,
    };

    pub fn from_raw(value: U256) -> Self {
        Self {
            value,
            scale: PhantomData,
        }
    }

    /// `units` whole units, i.e. `units * 10^DECIMALS`.
    pub fn from_units(units: u64) -> Self {
        // u64::MAX * 10^45 < 2^256, so this cannot overflow.
        Self::from_raw(U256::from(units) * U256::exp10(S::DECIMALS))
    }

    /// One whole unit (`10^DECIMALS`).
    pub fn one() -> Self {
        Self::from_raw(U256::exp10(S::DECIMALS))
    }

    pub fn raw(&self) -> U256 {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Result<Self, ArithmeticError> {
        arithmetic::add_unsigned(self.value, other.value).map(Self::from_raw)
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, ArithmeticError> {
        arithmetic::sub_unsigned(self.value, other.value).map(Self::from_raw)
    }

    pub fn add_delta(self, delta: Delta<S>) -> Result<Self, ArithmeticError> {
        arithmetic::add(self.value, delta.value).map(Self::from_raw)
    }

    pub fn sub_delta(self, delta: Delta<S>) -> Result<Self, ArithmeticError> {
        arithmetic::sub(self.value, delta.value).map(Self::from_raw)
    }

    /// Same quantity as a signed delta; fails above `I256::MAX`.
    pub fn to_delta(self) -> Result<Delta<S>, ArithmeticError> {
        I256::try_from_unsigned(self.value).map(Delta::from_raw)
    }
}

impl Amount<RawScale> {
    /// Reinterpret an unscaled value at scale `T`.
    pub fn into_scale<T: Scale>(self) -> Amount<T> {
        Amount::from_raw(self.value)
    }
}

impl Amount<WadScale> {
    /// `wad * ray -> rad`.
    pub fn mul_ray(self, ray: Ray) -> Result<Rad, ArithmeticError> {
        arithmetic::mul_unsigned(self.value, ray.value).map(Rad::from_raw)
    }

    /// `wad * signed ray -> signed rad`.
    pub fn mul_ray_delta(self, delta: RayDelta) -> Result<RadDelta, ArithmeticError> {
        arithmetic::mul(self.value, delta.value).map(RadDelta::from_raw)
    }
}

impl Amount<RayScale> {
    /// `ray * signed wad -> signed rad`.
    pub fn mul_wad_delta(self, delta: WadDelta) -> Result<RadDelta, ArithmeticError> {
        arithmetic::mul(self.value, delta.value).map(RadDelta::from_raw)
    }
}

impl<S: Scale> PartialEq for Amount<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<S: Scale> Eq for Amount<S> {}

impl<S: Scale> Ord for Amount<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<S: Scale> PartialOrd for Amount<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Scale> Hash for Amount<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl<S: Scale> fmt::Display for Amount<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<S: Scale> fmt::Debug for Amount<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", S::NAME, self.value)
    }
}

impl<S: Scale> FromStr for Amount<S> {
    type Err = ParseScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_unsigned(s).map(Self::from_raw)
    }
}

impl<S: Scale> Serialize for Amount<S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        serializer.collect_str(&self.value)
    }
}

impl<'de, S: Scale> Deserialize<'de> for Amount<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ── Delta ──────────────────────────────────────────────────────────

/// Signed scaled quantity: the change applied to an `Amount`.
#[derive(Clone, Copy, Default)]
pub struct Delta<S: Scale> {
    value: I256,
    scale: PhantomData<S>,
}

impl<S: Scale> Delta<S> {
    pub const ZERO: Self = Self {
        value: I256::ZERO,
        scale: PhantomData,
    };

    pub fn from_raw(value: I256) -> Self {
        Self {
            value,
            scale: PhantomData,
        }
    }

    /// `units * 10^DECIMALS`, with sign.
    pub fn from_units(units: i64) -> Self {
        let magnitude = U256::from(units.unsigned_abs()) * U256::exp10(S::DECIMALS);
        // |i64| * 10^45 is far inside the signed range.
        Self::from_raw(I256::from_parts(units < 0, magnitude).unwrap_or_default())
    }

    pub fn raw(&self) -> I256 {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.value.is_positive()
    }

    pub fn checked_add(self, other: Self) -> Result<Self, ArithmeticError> {
        arithmetic::add_signed(self.value, other.value).map(Self::from_raw)
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, ArithmeticError> {
        arithmetic::sub_signed(self.value, other.value).map(Self::from_raw)
    }

    pub fn checked_neg(self) -> Result<Self, ArithmeticError> {
        self.value.checked_neg().map(Self::from_raw)
    }
}

impl<S: Scale> PartialEq for Delta<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<S: Scale> Eq for Delta<S> {}

impl<S: Scale> Ord for Delta<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<S: Scale> PartialOrd for Delta<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Scale> fmt::Display for Delta<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<S: Scale> fmt::Debug for Delta<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Δ({})", S::NAME, self.value)
    }
}

impl<S: Scale> FromStr for Delta<S> {
    type Err = ParseScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<I256>().map(Self::from_raw)
    }
}

impl<S: Scale> Serialize for Delta<S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        serializer.collect_str(&self.value)
    }
}

impl<'de, S: Scale> Deserialize<'de> for Delta<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
