use crate::error::ConversionError;
use crate::sweep::{ImpedanceSweep, Sweep};
use crate::topology::Topology;
use num_complex::Complex64;
use serde::Serialize;
use simple_error::{SimpleError, bail};
use std::{fmt, str::FromStr};

/// What to do with a sample that sits exactly on a formula pole
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SingularityPolicy {
    /// Emit the infinite-impedance marker for that point and carry on
    #[default]
    Marker,
    /// Abort the conversion with `ConversionError::Singularity`
    Fail,
}

impl FromStr for SingularityPolicy {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "marker" | "inf" => Ok(SingularityPolicy::Marker),
            "fail" | "strict" => Ok(SingularityPolicy::Fail),
            _ => bail!("singularity policy '{}' not recognized", s),
        }
    }
}

impl fmt::Display for SingularityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingularityPolicy::Marker => write!(f, "marker"),
            SingularityPolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Converts S-parameter sweeps into impedance sweeps for one fixture
/// topology and reference impedance.
///
/// Holds no state besides its configuration; the same transformer can be
/// applied to any number of sweeps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImpedanceTransformer {
    topology: Topology,
    z0: f64,
    policy: SingularityPolicy,
}

impl ImpedanceTransformer {
    pub fn new(topology: Topology, z0: f64) -> Result<Self, ConversionError> {
        ImpedanceTransformerBuilder::new()
            .topology(topology)
            .z0(z0)
            .build()
    }

    pub fn builder() -> ImpedanceTransformerBuilder {
        ImpedanceTransformerBuilder::new()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn z0(&self) -> f64 {
        self.z0
    }

    pub fn policy(&self) -> SingularityPolicy {
        self.policy
    }

    /// Impedance for a single S-parameter value; `None` on the pole
    pub fn convert(&self, s: Complex64) -> Option<Complex64> {
        self.topology.impedance(self.z0, s)
    }

    pub fn transform(&self, sweep: &Sweep) -> Result<ImpedanceSweep, ConversionError> {
        tracing::debug!(
            "Converting {} points as {} with z0 = {} ohm",
            sweep.npts(),
            self.topology,
            self.z0
        );

        let mut data = Vec::with_capacity(sweep.npts());
        for (index, sample) in sweep.iter().enumerate() {
            let z = self.convert(sample.s);
            if z.is_none() {
                match self.policy {
                    SingularityPolicy::Marker => tracing::warn!(
                        "Sample {} at {} Hz lies on the {} pole, writing infinite impedance",
                        index,
                        sample.frequency,
                        self.topology
                    ),
                    SingularityPolicy::Fail => {
                        return Err(ConversionError::Singularity {
                            index,
                            frequency: sample.frequency,
                        });
                    }
                }
            }
            data.push(z);
        }

        Ok(ImpedanceSweep::new(sweep.freq().clone(), data))
    }
}

#[derive(Debug, Default)]
pub struct ImpedanceTransformerBuilder {
    topology: Topology,
    z0: Option<f64>,
    policy: SingularityPolicy,
}

impl ImpedanceTransformerBuilder {
    pub fn new() -> Self {
        ImpedanceTransformerBuilder::default()
    }

    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn topology_str(self, topology: &str) -> Result<Self, ConversionError> {
        let topology = Topology::from_str(topology)?;
        Ok(self.topology(topology))
    }

    pub fn z0(mut self, z0: f64) -> Self {
        self.z0 = Some(z0);
        self
    }

    pub fn policy(mut self, policy: SingularityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<ImpedanceTransformer, ConversionError> {
        let z0 = self
            .z0
            .ok_or_else(|| ConversionError::invalid_parameter("z0 must be set"))?;
        if !z0.is_finite() || z0 <= 0.0 {
            return Err(ConversionError::invalid_parameter(format!(
                "z0 must be a positive finite resistance, got {}",
                z0
            )));
        }
        Ok(ImpedanceTransformer {
            topology: self.topology,
            z0,
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frequency::Frequency;
    use crate::scale::Scale;
    use crate::sweep::Sample;
    use float_cmp::{F64Margin, approx_eq};

    const MARGIN: F64Margin = F64Margin {
        epsilon: 1e-9,
        ulps: 4,
    };

    fn sweep(values: &[Complex64]) -> Sweep {
        let freq = Frequency::from_vec((1..=values.len()).map(|x| x as f64).collect(), Scale::Giga);
        Sweep::new(freq, values.to_vec()).unwrap()
    }

    #[test]
    fn builder_rejects_bad_z0() {
        for z0 in [0.0, -50.0, f64::NAN, f64::INFINITY] {
            let err = ImpedanceTransformer::new(Topology::S11Shunt, z0).unwrap_err();
            assert!(matches!(err, ConversionError::InvalidParameter(_)), "z0 = {}", z0);
        }
        let err = ImpedanceTransformer::builder().build().unwrap_err();
        assert!(matches!(err, ConversionError::InvalidParameter(_)));
    }

    #[test]
    fn builder_rejects_unknown_topology() {
        let err = ImpedanceTransformer::builder()
            .topology_str("s31_shunt")
            .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidParameter(_)));
    }

    #[test]
    fn builder_defaults() {
        let transformer = ImpedanceTransformer::builder()
            .topology_str("s21_series")
            .unwrap()
            .z0(75.0)
            .build()
            .unwrap();
        assert_eq!(transformer.topology(), Topology::S21Series);
        assert_eq!(transformer.z0(), 75.0);
        assert_eq!(transformer.policy(), SingularityPolicy::Marker);
    }

    #[test]
    fn transform_preserves_length_and_order() {
        let input = Sweep::from_samples(&[
            Sample {
                frequency: 5e9,
                s: Complex64::new(0.5, 0.0),
            },
            Sample {
                frequency: 1e9,
                s: Complex64::new(0.25, 0.1),
            },
            Sample {
                frequency: 1e9,
                s: Complex64::new(-0.3, 0.2),
            },
        ]);
        let transformer = ImpedanceTransformer::new(Topology::S21Series, 50.0).unwrap();
        let output = transformer.transform(&input).unwrap();

        assert_eq!(output.npts(), input.npts());
        assert_eq!(output.freq(), input.freq());
        let z = output.get(0).unwrap().z.unwrap();
        assert!(approx_eq!(f64, z.re, 100.0, MARGIN));
        assert!(approx_eq!(f64, z.im, 0.0, MARGIN));
    }

    #[test]
    fn transform_marks_pole_and_continues() {
        let input = sweep(&[Complex64::new(0.2, 0.0), Complex64::ONE, Complex64::ZERO]);
        let transformer = ImpedanceTransformer::new(Topology::S11Shunt, 50.0).unwrap();
        let output = transformer.transform(&input).unwrap();

        assert_eq!(output.npts(), 3);
        assert_eq!(output.infinite_count(), 1);
        assert!(output.get(1).unwrap().is_infinite());
        assert_eq!(output.get(2).unwrap().z, Some(Complex64::new(50.0, 0.0)));
    }

    #[test]
    fn transform_fails_on_pole_when_strict() {
        let input = sweep(&[Complex64::new(0.5, 0.0), Complex64::ZERO]);
        let transformer = ImpedanceTransformer::builder()
            .topology(Topology::S21Series)
            .z0(50.0)
            .policy(SingularityPolicy::Fail)
            .build()
            .unwrap();
        let err = transformer.transform(&input).unwrap_err();

        assert_eq!(
            err,
            ConversionError::Singularity {
                index: 1,
                frequency: 2e9
            }
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(SingularityPolicy::from_str("marker").unwrap(), SingularityPolicy::Marker);
        assert_eq!(SingularityPolicy::from_str("STRICT").unwrap(), SingularityPolicy::Fail);
        assert!(SingularityPolicy::from_str("ignore").is_err());
    }
}
