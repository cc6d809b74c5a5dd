//! vic: calculate impedance from S-parameters.

use anyhow::{Context, Result};
use clap::Parser;
use rfimpedance::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "vic")]
#[command(author, version, about = "Calculate impedance from S-parameters", long_about = None)]
struct Cli {
    /// Measurement type (s11_shunt, s21_series, s21_shunt_through)
    #[arg(short = 't', long = "type", default_value = "s11_shunt")]
    topology: Topology,

    /// System impedance in ohm [default: Touchstone reference impedance]
    #[arg(short, long)]
    z0: Option<f64>,

    /// Output file name
    #[arg(short, long, default_value = "impedance.csv")]
    output: PathBuf,

    /// Output encoding (csv, json)
    #[arg(long, default_value = "csv")]
    output_format: OutputFormat,

    /// Value pair encoding of table input (ri, ma, db)
    #[arg(long, default_value = "ri")]
    format: ComplexNumberType,

    /// Frequency unit of table input (hz, khz, mhz, ghz, thz)
    #[arg(long, default_value = "hz")]
    freq_unit: Scale,

    /// Fail on a sample at a formula pole instead of writing infinite impedance
    #[arg(long)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Touchstone (.s1p, .s2p) or table S-parameters file name
    filename: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    run(&cli)
}

impl Cli {
    fn table_options(&self) -> TableOptions {
        TableOptions::new().format(self.format).scale(self.freq_unit)
    }

    fn policy(&self) -> SingularityPolicy {
        if self.strict {
            SingularityPolicy::Fail
        } else {
            SingularityPolicy::Marker
        }
    }

    /// `-z` wins over the Touchstone reference impedance
    fn system_impedance(&self, measurement: &Measurement) -> Result<f64> {
        let z0 = measurement
            .system_impedance(self.z0)
            .context("Unknown system impedance, use -z")?;
        if self.z0.is_some() {
            tracing::info!("Using command line supplied system impedance");
        } else {
            tracing::info!("Using touchstone system impedance");
        }
        tracing::info!("System impedance (z0): {} ohm", z0);
        Ok(z0)
    }

    fn transformer(&self, measurement: &Measurement) -> Result<ImpedanceTransformer> {
        let transformer = ImpedanceTransformer::builder()
            .topology(self.topology)
            .z0(self.system_impedance(measurement)?)
            .policy(self.policy())
            .build()?;
        tracing::info!("Measurement type: {}", self.topology);
        Ok(transformer)
    }
}

fn run(cli: &Cli) -> Result<()> {
    let measurement = read_sweep(&cli.filename, cli.topology.parameter(), &cli.table_options())
        .with_context(|| format!("Cannot open S-parameters file {:?}", cli.filename))?;
    tracing::info!("Loaded {:?}", cli.filename);

    let transformer = cli.transformer(&measurement)?;
    let impedance = transformer.transform(&measurement.sweep)?;
    if impedance.infinite_count() > 0 {
        tracing::warn!(
            "{} of {} points are infinite impedance",
            impedance.infinite_count(),
            impedance.npts()
        );
    }

    write_impedance_file(&cli.output, cli.output_format, &transformer, &impedance)
        .with_context(|| format!("Cannot write impedance file {:?}", cli.output))?;
    tracing::info!("Wrote {} points to {:?}", impedance.npts(), cli.output);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn output(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vic_{}_{}", std::process::id(), name))
    }

    fn read(cli: &Cli) -> Measurement {
        read_sweep(&cli.filename, cli.topology.parameter(), &cli.table_options()).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vic").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_defaults() {
        let cli = parse(&["data/shunt.s1p"]);

        assert_eq!(cli.topology, Topology::S11Shunt);
        assert_eq!(cli.z0, None);
        assert_eq!(cli.output, PathBuf::from("impedance.csv"));
        assert_eq!(cli.output_format, OutputFormat::Csv);
        assert_eq!(cli.policy(), SingularityPolicy::Marker);
        assert_eq!(cli.table_options(), TableOptions::default());
    }

    #[test]
    fn cli_table_options() {
        let cli = parse(&["--format", "ma", "--freq-unit", "GHz", "sweep.csv"]);
        let options = cli.table_options();

        assert_eq!(options.get_format(), ComplexNumberType::MagAng);
        assert_eq!(options.get_scale(), Scale::Giga);
    }

    #[test]
    fn cli_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["vic", "-t", "s22_shunt", "dut.s2p"]).is_err());
    }

    #[test]
    fn cli_z0_overrides_touchstone() {
        let cli = parse(&["-z", "75", "-t", "s21_series", "--strict", "data/through.s2p"]);
        let measurement = read(&cli);
        let transformer = cli.transformer(&measurement).unwrap();

        assert_eq!(measurement.z0, Some(50.0));
        assert_eq!(transformer.z0(), 75.0);
        assert_eq!(transformer.topology(), Topology::S21Series);
        assert_eq!(transformer.policy(), SingularityPolicy::Fail);
    }

    #[test]
    fn cli_z0_from_touchstone() {
        let cli = parse(&["data/shunt.s1p"]);
        let measurement = read(&cli);

        assert_eq!(cli.transformer(&measurement).unwrap().z0(), 50.0);
    }

    #[test]
    fn cli_table_needs_z0() {
        let cli = parse(&["data/sweep.csv"]);
        let measurement = read(&cli);
        let err = cli.transformer(&measurement).unwrap_err();

        assert_eq!(err.to_string(), "Unknown system impedance, use -z");
    }

    #[test]
    fn run_writes_impedance() {
        let path = output("run.json");
        let cli = parse(&[
            "-z",
            "50",
            "--output-format",
            "json",
            "-o",
            path.to_str().unwrap(),
            "data/sweep.csv",
        ]);
        run(&cli).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["topology"], "s11_shunt");
        assert_eq!(json["samples"].as_array().unwrap().len(), 4);
        assert_eq!(json["samples"][1]["z_re"], 50.0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn run_strict_stops_on_pole() {
        let path = output("strict.csv");
        let cli = parse(&[
            "-t",
            "s21_series",
            "--strict",
            "-o",
            path.to_str().unwrap(),
            "data/through.s2p",
        ]);
        let err = run(&cli).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConversionError>(),
            Some(&ConversionError::Singularity {
                index: 2,
                frequency: 3e9
            })
        );
        assert!(!path.exists());
    }
}
