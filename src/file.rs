//! Reading S-parameter sweeps and writing impedance sweeps.
//!
//! Two input encodings are understood: delimited tables (`table`) and
//! Touchstone 1-port/2-port files (`touchstone`). `read_sweep` picks one by
//! file extension.

use crate::error::ConversionError;
use crate::parameter::SParameter;
use crate::sweep::Sweep;
use regex::Regex;
use std::path::Path;

pub mod output;
pub mod table;
pub mod touchstone;

pub use self::output::{OutputFormat, write_impedance, write_impedance_file};
pub use self::table::{TableOptions, read_table, read_table_file};
pub use self::touchstone::{Touchstone, read_touchstone, read_touchstone_from};

/// A sweep together with the reference impedance its file declared, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub sweep: Sweep,
    pub z0: Option<f64>,
}

impl Measurement {
    /// Reference impedance for the conversion: `z0` when given, otherwise the
    /// one the file declared.
    pub fn system_impedance(&self, z0: Option<f64>) -> Result<f64, ConversionError> {
        z0.or(self.z0).ok_or_else(|| {
            ConversionError::invalid_parameter("no system impedance given and none in the file")
        })
    }
}

/// Parse a token as a finite real number
pub(crate) fn parse_number(token: &str, line: usize, field: &str) -> Result<f64, ConversionError> {
    let val: f64 = token.parse().map_err(|_| {
        ConversionError::format(line, format!("{} '{}' is not a number", field, token))
    })?;
    if !val.is_finite() {
        return Err(ConversionError::format(
            line,
            format!("{} '{}' is not finite", field, token),
        ));
    }
    Ok(val)
}

/// Port count encoded in a `.sNp` extension
pub fn touchstone_ports(path: &Path) -> Option<usize> {
    let re_file_ext = Regex::new(r"(?i)^s(\d+)p$").expect("Invalid regex!");
    let ext = path.extension()?.to_str()?;
    re_file_ext.captures(ext)?[1].parse().ok()
}

/// Read `parameter` from a Touchstone file, or the single S column of a table.
pub fn read_sweep(
    path: &Path,
    parameter: SParameter,
    options: &TableOptions,
) -> Result<Measurement, ConversionError> {
    if touchstone_ports(path).is_some() {
        let touchstone = read_touchstone(path)?;
        Ok(Measurement {
            sweep: touchstone.sweep(parameter)?,
            z0: Some(touchstone.z0()),
        })
    } else {
        tracing::debug!("Reading {:?} as a table of {}", path, parameter);
        Ok(Measurement {
            sweep: read_table_file(path, options)?,
            z0: None,
        })
    }
}
