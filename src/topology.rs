//! Fixture topologies and the closed-form S-parameter to impedance formulas.
//!
//! Every formula is a pure function of one complex sample and the real
//! reference impedance `z0`. A formula evaluated on its pole yields `None`;
//! for all three topologies the pole is an open circuit (infinite impedance).

use crate::parameter::SParameter;
use num_complex::Complex64;
use serde::Serialize;
use simple_error::{SimpleError, bail};
use std::{fmt, str::FromStr};

/// How the element under test is mounted in the measurement fixture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Reflection from an element shunted to ground at port 1
    #[default]
    S11Shunt,
    /// Element in series in the through path
    S21Series,
    /// Element shunting the through path to ground
    S21ShuntThrough,
}

impl Topology {
    pub const ALL: [Topology; 3] = [
        Topology::S11Shunt,
        Topology::S21Series,
        Topology::S21ShuntThrough,
    ];

    /// The S matrix entry the topology consumes
    pub fn parameter(&self) -> SParameter {
        match self {
            Topology::S11Shunt => SParameter::S11,
            Topology::S21Series | Topology::S21ShuntThrough => SParameter::S21,
        }
    }

    /// Impedance of the element from the measured S-parameter
    pub fn impedance(&self, z0: f64, s: Complex64) -> Option<Complex64> {
        match self {
            Topology::S11Shunt => s11_shunt_impedance(z0, s),
            Topology::S21Series => s21_series_impedance(z0, s),
            Topology::S21ShuntThrough => s21_shunt_through_impedance(z0, s),
        }
    }

    /// S-parameter the fixture would measure for an element of impedance `z`
    pub fn sparameter(&self, z0: f64, z: Complex64) -> Option<Complex64> {
        match self {
            Topology::S11Shunt => s11_shunt_sparameter(z0, z),
            Topology::S21Series => s21_series_sparameter(z0, z),
            Topology::S21ShuntThrough => s21_shunt_through_sparameter(z0, z),
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            Topology::S11Shunt => "s11_shunt",
            Topology::S21Series => "s21_series",
            Topology::S21ShuntThrough => "s21_shunt_through",
        }
    }
}

impl FromStr for Topology {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "s11_shunt" => Ok(Topology::S11Shunt),
            "s21_series" => Ok(Topology::S21Series),
            "s21_shunt_through" => Ok(Topology::S21ShuntThrough),
            _ => bail!("topology '{}' not recognized", s),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

fn checked_div(num: Complex64, den: Complex64) -> Option<Complex64> {
    if den == Complex64::ZERO {
        None
    } else {
        Some(num / den)
    }
}

/// Z = z0 (1 + S11) / (1 - S11)
pub fn s11_shunt_impedance(z0: f64, s11: Complex64) -> Option<Complex64> {
    checked_div(z0 * (1.0 + s11), 1.0 - s11)
}

/// Z = 2 z0 (1 - S21) / S21
pub fn s21_series_impedance(z0: f64, s21: Complex64) -> Option<Complex64> {
    checked_div(2.0 * z0 * (1.0 - s21), s21)
}

/// Z = z0 S21 / (2 (1 - S21))
pub fn s21_shunt_through_impedance(z0: f64, s21: Complex64) -> Option<Complex64> {
    checked_div(z0 * s21, 2.0 * (1.0 - s21))
}

/// S11 = (Z - z0) / (Z + z0)
pub fn s11_shunt_sparameter(z0: f64, z: Complex64) -> Option<Complex64> {
    checked_div(z - z0, z + z0)
}

/// S21 = 2 z0 / (Z + 2 z0)
pub fn s21_series_sparameter(z0: f64, z: Complex64) -> Option<Complex64> {
    checked_div(Complex64::from(2.0 * z0), z + 2.0 * z0)
}

/// S21 = 2 Z / (2 Z + z0)
pub fn s21_shunt_through_sparameter(z0: f64, z: Complex64) -> Option<Complex64> {
    checked_div(2.0 * z, 2.0 * z + z0)
}
