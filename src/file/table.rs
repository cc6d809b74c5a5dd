use super::parse_number;
use crate::error::ConversionError;
use crate::frequency::Frequency;
use crate::parameter::ComplexNumberType;
use crate::scale::Scale;
use crate::sweep::Sweep;
use num_complex::Complex64;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column conventions of a delimited sweep table.
///
/// Rows are `frequency, a, b` where `(a, b)` is decoded by `format` and the
/// frequency is expressed in `scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableOptions {
    format: ComplexNumberType,
    scale: Scale,
    delimiter: u8,
}

impl TableOptions {
    pub fn new() -> Self {
        TableOptions::default()
    }

    pub fn format(mut self, format: ComplexNumberType) -> Self {
        self.format = format;
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn get_format(&self) -> ComplexNumberType {
        self.format
    }

    pub fn get_scale(&self) -> Scale {
        self.scale
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            format: ComplexNumberType::ReIm,
            scale: Scale::Base,
            delimiter: b',',
        }
    }
}

/// Read a sweep table from any byte source.
///
/// `!` starts a comment line. The first row may be a header if its first
/// field starts with `freq`; every other row must hold exactly three numbers.
pub fn read_table<R: Read>(reader: R, options: &TableOptions) -> Result<Sweep, ConversionError> {
    let re_header = Regex::new(r"(?i)^freq").expect("Invalid regex!");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .comment(Some(b'!'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut freq_tmp: Vec<f64> = vec![];
    let mut data: Vec<Complex64> = vec![];
    let mut record = csv::StringRecord::new();
    let mut first_row = true;
    let mut line = 0;

    while rdr.read_record(&mut record)? {
        line = record.position().map(|p| p.line() as usize).unwrap_or(line + 1);
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if first_row {
            first_row = false;
            if re_header.is_match(&record[0]) {
                continue;
            }
        }
        if record.len() != 3 {
            return Err(ConversionError::format(
                line,
                format!(
                    "expected 3 fields (frequency and an {} pair), found {}",
                    options.format,
                    record.len()
                ),
            ));
        }

        let f = parse_number(&record[0], line, "frequency")?;
        if f <= 0.0 {
            return Err(ConversionError::format(
                line,
                format!("frequency {} is not positive", f),
            ));
        }
        if !options.scale.unscale(f).is_finite() {
            return Err(ConversionError::format(
                line,
                format!("frequency {} {} overflows", f, options.scale),
            ));
        }
        let x = parse_number(&record[1], line, "first value")?;
        let y = parse_number(&record[2], line, "second value")?;

        freq_tmp.push(f);
        data.push(options.format.parse(x, y));
    }

    if data.is_empty() {
        return Err(ConversionError::format(line, "table holds no data rows"));
    }

    let freq = Frequency::from_vec(freq_tmp, options.scale);
    if !freq.is_increasing() {
        tracing::warn!("Table frequencies are not strictly increasing, keeping input order");
    }
    tracing::debug!("Read {} table rows", data.len());

    Sweep::new(freq, data)
}

pub fn read_table_file(path: &Path, options: &TableOptions) -> Result<Sweep, ConversionError> {
    let file = File::open(path)
        .map_err(|e| ConversionError::Io(format!("cannot open {:?}: {}", path, e)))?;
    read_table(file, options)
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::{F64Margin, approx_eq};

    const MARGIN: F64Margin = F64Margin {
        epsilon: 1e-12,
        ulps: 4,
    };

    #[test]
    fn read_table_reim_with_header() {
        let content = "frequency_hz,s_re,s_im\n\
                       1e9,0.5,0.0\n\
                       ! mid-sweep note\n\
                       \n\
                       2e9, -0.25 , 0.125\n";
        let sweep = read_table(content.as_bytes(), &TableOptions::default()).unwrap();

        assert_eq!(sweep.npts(), 2);
        assert_eq!(sweep.freq().hz(), vec![1e9, 2e9]);
        assert_eq!(sweep.values()[1], Complex64::new(-0.25, 0.125));
    }

    #[test]
    fn read_table_magang_scaled() {
        let content = "1.0;2.0;90\n1.5;1.0;180\n";
        let options = TableOptions::new()
            .format(ComplexNumberType::MagAng)
            .scale(Scale::Giga)
            .delimiter(b';');
        let sweep = read_table(content.as_bytes(), &options).unwrap();

        assert_eq!(sweep.freq().hz(), vec![1.0e9, 1.5e9]);
        let s = sweep.values()[0];
        assert!(approx_eq!(f64, s.re, 0.0, MARGIN));
        assert!(approx_eq!(f64, s.im, 2.0, MARGIN));
        let s = sweep.values()[1];
        assert!(approx_eq!(f64, s.re, -1.0, MARGIN));
    }

    #[test]
    fn read_table_keeps_duplicates() {
        let content = "1e6,0.1,0\n1e6,0.2,0\n5e5,0.3,0\n";
        let sweep = read_table(content.as_bytes(), &TableOptions::default()).unwrap();

        assert_eq!(sweep.freq().hz(), vec![1e6, 1e6, 5e5]);
        assert_eq!(sweep.values()[1], Complex64::new(0.2, 0.0));
    }

    #[test]
    fn read_table_rejects_non_numeric_frequency() {
        let content = "1e9,0.5,0.0\nabc,0.5,0.0\n";
        let err = read_table(content.as_bytes(), &TableOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ConversionError::format(2, "frequency 'abc' is not a number")
        );
    }

    #[test]
    fn read_table_rejects_header_after_data() {
        let content = "1e9,0.5,0.0\nfrequency,re,im\n";
        let err = read_table(content.as_bytes(), &TableOptions::default()).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn read_table_rejects_missing_column() {
        let content = "1e9,0.5\n";
        let err = read_table(content.as_bytes(), &TableOptions::default()).unwrap_err();
        assert!(matches!(err, ConversionError::Format { line: 1, .. }));
    }

    #[test]
    fn read_table_rejects_extra_column() {
        let content = "1e9,0.5,0.1,0.2\n";
        let err = read_table(content.as_bytes(), &TableOptions::default()).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn read_table_rejects_bad_values() {
        for content in ["0,0.5,0.1\n", "-1e9,0.5,0.1\n", "1e9,nan,0.1\n", "1e9,0.5,x\n"] {
            let err = read_table(content.as_bytes(), &TableOptions::default()).unwrap_err();
            assert!(err.is_format(), "accepted {:?}", content);
        }
    }

    #[test]
    fn read_table_rejects_frequency_overflow() {
        let content = "1,0.5,0.1\n1e300,0.5,0.1\n";
        let options = TableOptions::new().scale(Scale::Tera);
        let err = read_table(content.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, ConversionError::Format { line: 2, .. }));
    }

    #[test]
    fn read_table_rejects_empty() {
        let content = "freq,re,im\n! nothing measured\n";
        let err = read_table(content.as_bytes(), &TableOptions::default()).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn read_table_file_missing() {
        let err = read_table_file(Path::new("./data/does_not_exist.csv"), &TableOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConversionError::Io(_)));
    }
}
