use crate::scale::Scale;
use faer::Row;

// Frequency stores values in Hz
#[derive(Clone, Debug)]
pub struct Frequency {
    pts: Row<f64>,
}

impl Frequency {
    fn f_scaled(&self, scale: Scale) -> Vec<f64> {
        self.iter().map(|f| scale.scale(f)).collect()
    }

    pub fn freq(&self, pt: usize) -> f64 {
        self.pts.read(pt)
    }

    pub fn from_vec(f: Vec<f64>, scale: Scale) -> Frequency {
        Frequency {
            pts: Row::<f64>::from_fn(f.len(), |i| scale.unscale(f[i])),
        }
    }

    pub fn ghz(&self) -> Vec<f64> {
        self.f_scaled(Scale::Giga)
    }

    pub fn hz(&self) -> Vec<f64> {
        self.f_scaled(Scale::Base)
    }

    pub fn is_empty(&self) -> bool {
        self.npts() == 0
    }

    /// Frequencies in Hz, in stored order
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.npts()).map(move |i| self.pts.read(i))
    }

    /// True when every point is strictly above the one before it
    pub fn is_increasing(&self) -> bool {
        (1..self.npts()).all(|i| self.pts.read(i) > self.pts.read(i - 1))
    }

    pub fn npts(&self) -> usize {
        self.pts.ncols()
    }
}

impl PartialEq for Frequency {
    fn eq(&self, other: &Self) -> bool {
        self.npts() == other.npts() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}
