use core::fmt;
use num_complex::Complex64;
use serde::Serialize;
use simple_error::{SimpleError, bail};
use std::str::FromStr;

/// Entry of a 2-port S matrix consumed by a fixture topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SParameter {
    S11,
    S21,
    S12,
    S22,
}

impl SParameter {
    /// (row, column) of the parameter in the S matrix, zero based
    pub fn index(&self) -> (usize, usize) {
        match self {
            SParameter::S11 => (0, 0),
            SParameter::S21 => (1, 0),
            SParameter::S12 => (0, 1),
            SParameter::S22 => (1, 1),
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            SParameter::S11 => "S11",
            SParameter::S21 => "S21",
            SParameter::S12 => "S12",
            SParameter::S22 => "S22",
        }
    }
}

impl FromStr for SParameter {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s11" => Ok(SParameter::S11),
            "s21" => Ok(SParameter::S21),
            "s12" => Ok(SParameter::S12),
            "s22" => Ok(SParameter::S22),
            _ => bail!("string not recognized"),
        }
    }
}

impl fmt::Display for SParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Encoding of a complex value as a pair of numbers in an input file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ComplexNumberType {
    #[default]
    ReIm,
    MagAng,
    Db,
}

impl ComplexNumberType {
    /// Decode a pair; angles are in degrees.
    pub fn parse(&self, x: f64, y: f64) -> Complex64 {
        match self {
            ComplexNumberType::ReIm => Complex64::new(x, y),
            ComplexNumberType::MagAng => Complex64::from_polar(x, y.to_radians()),
            ComplexNumberType::Db => Complex64::from_polar(10_f64.powf(x / 20.0), y.to_radians()),
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            ComplexNumberType::ReIm => "RI",
            ComplexNumberType::MagAng => "MA",
            ComplexNumberType::Db => "DB",
        }
    }
}

impl FromStr for ComplexNumberType {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ri" | "reim" => Ok(ComplexNumberType::ReIm),
            "ma" | "magang" => Ok(ComplexNumberType::MagAng),
            "db" | "dbang" => Ok(ComplexNumberType::Db),
            _ => bail!("complex number format '{}' not recognized", s),
        }
    }
}

impl fmt::Display for ComplexNumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
