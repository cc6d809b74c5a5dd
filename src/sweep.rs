use crate::error::ConversionError;
use crate::frequency::Frequency;
use crate::scale::Scale;
use num_complex::Complex64;

/// One measured point: frequency in Hz and the complex S-parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub frequency: f64,
    pub s: Complex64,
}

/// Ordered S-parameter samples, immutable once read.
#[derive(Clone, Debug, PartialEq)]
pub struct Sweep {
    freq: Frequency,
    data: Vec<Complex64>,
}

impl Sweep {
    pub fn new(freq: Frequency, data: Vec<Complex64>) -> Result<Sweep, ConversionError> {
        if freq.npts() != data.len() {
            return Err(ConversionError::invalid_parameter(format!(
                "sweep has {} frequencies but {} values",
                freq.npts(),
                data.len()
            )));
        }
        Ok(Sweep { freq, data })
    }

    pub fn from_samples(samples: &[Sample]) -> Sweep {
        Sweep {
            freq: Frequency::from_vec(samples.iter().map(|x| x.frequency).collect(), Scale::Base),
            data: samples.iter().map(|x| x.s).collect(),
        }
    }

    pub fn freq(&self) -> &Frequency {
        &self.freq
    }

    pub fn values(&self) -> &[Complex64] {
        &self.data
    }

    pub fn get(&self, pt: usize) -> Option<Sample> {
        self.data.get(pt).map(|&s| Sample {
            frequency: self.freq.freq(pt),
            s,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.freq
            .iter()
            .zip(self.data.iter())
            .map(|(frequency, &s)| Sample { frequency, s })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn npts(&self) -> usize {
        self.data.len()
    }
}

/// Converted point. `z` is `None` where the sample sat on the formula pole,
/// i.e. the element looked like an open circuit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpedanceSample {
    pub frequency: f64,
    pub z: Option<Complex64>,
}

impl ImpedanceSample {
    pub fn is_infinite(&self) -> bool {
        self.z.is_none()
    }
}

/// Impedance result, one entry per input sample in input order.
#[derive(Clone, Debug, PartialEq)]
pub struct ImpedanceSweep {
    freq: Frequency,
    data: Vec<Option<Complex64>>,
}

impl ImpedanceSweep {
    // Only the transformer builds these, always from a sweep of the same length
    pub(crate) fn new(freq: Frequency, data: Vec<Option<Complex64>>) -> ImpedanceSweep {
        debug_assert_eq!(freq.npts(), data.len());
        ImpedanceSweep { freq, data }
    }

    pub fn freq(&self) -> &Frequency {
        &self.freq
    }

    pub fn values(&self) -> &[Option<Complex64>] {
        &self.data
    }

    pub fn get(&self, pt: usize) -> Option<ImpedanceSample> {
        self.data.get(pt).map(|&z| ImpedanceSample {
            frequency: self.freq.freq(pt),
            z,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ImpedanceSample> + '_ {
        self.freq
            .iter()
            .zip(self.data.iter())
            .map(|(frequency, &z)| ImpedanceSample { frequency, z })
    }

    /// Number of points that hit a pole
    pub fn infinite_count(&self) -> usize {
        self.data.iter().filter(|z| z.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn npts(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sweep_from_samples_keeps_order_and_duplicates() {
        let samples = vec![
            Sample {
                frequency: 3e9,
                s: Complex64::new(0.1, 0.0),
            },
            Sample {
                frequency: 1e9,
                s: Complex64::new(0.2, 0.0),
            },
            Sample {
                frequency: 1e9,
                s: Complex64::new(0.3, 0.0),
            },
        ];
        let sweep = Sweep::from_samples(&samples);

        assert_eq!(sweep.npts(), 3);
        assert_eq!(sweep.iter().collect::<Vec<_>>(), samples);
        assert_eq!(sweep.get(2), Some(samples[2]));
        assert_eq!(sweep.get(3), None);
    }

    #[test]
    fn sweep_rejects_length_mismatch() {
        let freq = Frequency::from_vec(vec![1.0, 2.0], Scale::Giga);
        let err = Sweep::new(freq, vec![Complex64::ZERO]).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidParameter(_)));
    }

    #[test]
    fn impedance_sweep_counts_poles() {
        let freq = Frequency::from_vec(vec![1.0, 2.0, 3.0], Scale::Mega);
        let sweep = ImpedanceSweep::new(freq, vec![Some(Complex64::ONE), None, None]);

        assert_eq!(sweep.infinite_count(), 2);
        assert!(sweep.get(1).unwrap().is_infinite());
        assert_eq!(sweep.get(0).unwrap().frequency, 1e6);
    }
}
