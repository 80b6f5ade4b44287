//! Newtype wrappers for the physical quantities that flow through the
//! profile pipeline.
//!
//! Capacity density times area yields capacity, metres and kilometres are not
//! interchangeable, and a layout weight cannot be confused with a plain area.
//!
//! ```
//! use profgen_core::units::{CapacityDensity, Megawatts, SquareKilometres};
//!
//! let density = CapacityDensity(3.0);
//! let capacity: Megawatts = density * SquareKilometres(4.0);
//! assert_eq!(capacity, Megawatts(12.0));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Installed or installable capacity in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Area in square kilometres (km²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct SquareKilometres(pub f64);

impl_unit_ops!(SquareKilometres, "km²");

/// Capacity density in megawatts per square kilometre (MW/km²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct CapacityDensity(pub f64);

impl_unit_ops!(CapacityDensity, "MW/km²");

impl Mul<SquareKilometres> for CapacityDensity {
    type Output = Megawatts;
    fn mul(self, rhs: SquareKilometres) -> Megawatts {
        Megawatts(self.0 * rhs.0)
    }
}

/// Distance in kilometres (km)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilometres(pub f64);

impl_unit_ops!(Kilometres, "km");

/// Distance in metres (m), used for buffer widths and water depths
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Metres(pub f64);

impl_unit_ops!(Metres, "m");

impl Metres {
    #[inline]
    pub fn to_kilometres(self) -> Kilometres {
        Kilometres(self.0 / 1000.0)
    }
}
