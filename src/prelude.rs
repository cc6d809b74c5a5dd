//! rfimpedance prelude.
//!
//! The types and functions needed for a read, convert, write pass.
//!
//! ```
//! use rfimpedance::prelude::*;
//!
//! ```

#[doc(no_inline)]
pub use crate::error::ConversionError;

#[doc(no_inline)]
pub use crate::file::{
    Measurement, OutputFormat, TableOptions, Touchstone, read_sweep, read_table,
    read_table_file, read_touchstone, read_touchstone_from, write_impedance,
    write_impedance_file,
};

#[doc(no_inline)]
pub use crate::frequency::Frequency;

#[doc(no_inline)]
pub use crate::impedance::{ImpedanceTransformer, ImpedanceTransformerBuilder, SingularityPolicy};

#[doc(no_inline)]
pub use crate::parameter::{ComplexNumberType, SParameter};

#[doc(no_inline)]
pub use crate::scale::Scale;

#[doc(no_inline)]
pub use crate::sweep::{ImpedanceSample, ImpedanceSweep, Sample, Sweep};

#[doc(no_inline)]
pub use crate::topology::Topology;

#[doc(no_inline)]
pub use num_complex::Complex64;
