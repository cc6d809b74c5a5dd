use crate::error::ConversionError;
use crate::impedance::ImpedanceTransformer;
use crate::sweep::{ImpedanceSample, ImpedanceSweep};
use crate::topology::Topology;
use serde::Serialize;
use simple_error::{SimpleError, bail};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::{fmt, str::FromStr};

pub const CSV_HEADER: [&str; 5] = ["frequency_hz", "z_re", "z_im", "z_mag", "z_deg"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => bail!("output format '{}' not recognized", s),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// One output row. An infinite impedance is written as `inf` for the
/// rectangular parts and magnitude, with an undefined (`NaN`) angle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImpedanceRecord {
    pub frequency_hz: f64,
    pub z_re: f64,
    pub z_im: f64,
    pub z_mag: f64,
    pub z_deg: f64,
}

impl From<ImpedanceSample> for ImpedanceRecord {
    fn from(sample: ImpedanceSample) -> Self {
        match sample.z {
            Some(z) => ImpedanceRecord {
                frequency_hz: sample.frequency,
                z_re: z.re,
                z_im: z.im,
                z_mag: z.norm(),
                z_deg: z.arg().to_degrees(),
            },
            None => ImpedanceRecord {
                frequency_hz: sample.frequency,
                z_re: f64::INFINITY,
                z_im: f64::INFINITY,
                z_mag: f64::INFINITY,
                z_deg: f64::NAN,
            },
        }
    }
}

#[derive(Serialize)]
struct ImpedanceReport {
    topology: Topology,
    z0: f64,
    samples: Vec<ImpedanceRecord>,
}

pub fn write_csv<W: Write>(writer: W, sweep: &ImpedanceSweep) -> Result<(), ConversionError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for sample in sweep.iter() {
        wtr.serialize(ImpedanceRecord::from(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(
    writer: W,
    transformer: &ImpedanceTransformer,
    sweep: &ImpedanceSweep,
) -> Result<(), ConversionError> {
    let report = ImpedanceReport {
        topology: transformer.topology(),
        z0: transformer.z0(),
        samples: sweep.iter().map(ImpedanceRecord::from).collect(),
    };
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

pub fn write_impedance<W: Write>(
    writer: W,
    format: OutputFormat,
    transformer: &ImpedanceTransformer,
    sweep: &ImpedanceSweep,
) -> Result<(), ConversionError> {
    match format {
        OutputFormat::Csv => write_csv(writer, sweep),
        OutputFormat::Json => write_json(writer, transformer, sweep),
    }
}

pub fn write_impedance_file(
    path: &Path,
    format: OutputFormat,
    transformer: &ImpedanceTransformer,
    sweep: &ImpedanceSweep,
) -> Result<(), ConversionError> {
    let file = File::create(path)
        .map_err(|e| ConversionError::Io(format!("cannot create {:?}: {}", path, e)))?;
    let mut writer = BufWriter::new(file);
    write_impedance(&mut writer, format, transformer, sweep)?;
    writer.flush()?;
    tracing::debug!("Wrote {} points to {:?}", sweep.npts(), path);
    Ok(())
}
