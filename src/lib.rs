//! Impedance of a device under test from vector network analyzer
//! S-parameters, for S11 shunt, S21 series and S21 shunt-through fixtures.
//!
//! ```no_run
//! use rfimpedance::prelude::*;
//! use std::path::Path;
//!
//! let measurement = read_sweep(
//!     Path::new("dut.s2p"),
//!     Topology::S21Series.parameter(),
//!     &TableOptions::default(),
//! )?;
//! let transformer = ImpedanceTransformer::new(Topology::S21Series, 50.0)?;
//! let z = transformer.transform(&measurement.sweep)?;
//! write_impedance_file(Path::new("impedance.csv"), OutputFormat::Csv, &transformer, &z)?;
//! # Ok::<(), ConversionError>(())
//! ```
pub mod error;
pub mod file;
pub mod frequency;
pub mod impedance;
pub mod parameter;
pub mod prelude;
pub mod scale;
pub mod sweep;
pub mod topology;
