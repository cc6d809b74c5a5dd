use serde::Serialize;
use simple_error::{SimpleError, bail};
use std::{fmt, str::FromStr};

/// Frequency unit multiplier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Scale {
    #[default]
    Base,
    Kilo,
    Mega,
    Giga,
    Tera,
}

impl Scale {
    /// Provides multiplier for scale
    /// Scale::Giga = 1e9
    pub fn multiplier(&self) -> f64 {
        match self {
            Scale::Base => 1.0,
            Scale::Kilo => 1e3,
            Scale::Mega => 1e6,
            Scale::Giga => 1e9,
            Scale::Tera => 1e12,
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            Scale::Base => "Hz",
            Scale::Kilo => "kHz",
            Scale::Mega => "MHz",
            Scale::Giga => "GHz",
            Scale::Tera => "THz",
        }
    }

    pub fn scale(&self, val: f64) -> f64 {
        val / self.multiplier()
    }

    pub fn unscale(&self, val: f64) -> f64 {
        val * self.multiplier()
    }
}

impl FromStr for Scale {
    type Err = SimpleError;

    // Touchstone option lines are case-insensitive, so "MHZ" and "mhz" are both mega
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hz" | "base" => Ok(Scale::Base),
            "khz" | "kilo" => Ok(Scale::Kilo),
            "mhz" | "mega" => Ok(Scale::Mega),
            "ghz" | "giga" => Ok(Scale::Giga),
            "thz" | "tera" => Ok(Scale::Tera),
            _ => bail!("frequency unit '{}' not recognized", s),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
