use super::{parse_number, touchstone_ports};
use crate::error::ConversionError;
use crate::frequency::Frequency;
use crate::parameter::{ComplexNumberType, SParameter};
use crate::scale::Scale;
use crate::sweep::Sweep;
use num_complex::Complex64;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// S-parameter data of a 1-port or 2-port Touchstone file.
#[derive(Clone, Debug, PartialEq)]
pub struct Touchstone {
    nports: usize,
    scale: Scale,
    format: ComplexNumberType,
    z0: f64,
    comments: String,
    freq: Frequency,
    // row-major nports x nports matrix per frequency point
    data: Vec<Vec<Complex64>>,
}

impl Touchstone {
    pub fn nports(&self) -> usize {
        self.nports
    }

    /// Frequency unit declared on the option line
    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn format(&self) -> ComplexNumberType {
        self.format
    }

    /// Reference impedance from the option line (`R`), 50 ohm when absent
    pub fn z0(&self) -> f64 {
        self.z0
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn freq(&self) -> &Frequency {
        &self.freq
    }

    pub fn npts(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, pt: usize, parameter: SParameter) -> Option<Complex64> {
        let (i, j) = parameter.index();
        if i >= self.nports || j >= self.nports {
            return None;
        }
        self.data.get(pt).map(|x| x[i * self.nports + j])
    }

    /// Sweep of one matrix entry over all frequencies
    pub fn sweep(&self, parameter: SParameter) -> Result<Sweep, ConversionError> {
        let (i, j) = parameter.index();
        if i >= self.nports || j >= self.nports {
            return Err(ConversionError::invalid_parameter(format!(
                "{} is not available in a {}-port file",
                parameter, self.nports
            )));
        }
        let data = self
            .data
            .iter()
            .map(|x| x[i * self.nports + j])
            .collect();
        Sweep::new(self.freq.clone(), data)
    }
}

#[derive(Clone, Copy, Debug)]
struct OptionLine {
    scale: Scale,
    format: ComplexNumberType,
    z0: f64,
}

impl Default for OptionLine {
    fn default() -> Self {
        OptionLine {
            scale: Scale::Giga,
            format: ComplexNumberType::MagAng,
            z0: 50.0,
        }
    }
}

// `# [unit] [parameter] [format] [R n]`, tokens in any order
fn parse_option_line(content: &str, line: usize) -> Result<OptionLine, ConversionError> {
    let mut options = OptionLine::default();
    let mut tokens = content.trim_start_matches('#').split_whitespace();

    while let Some(token) = tokens.next() {
        match token.to_lowercase().as_str() {
            "hz" | "khz" | "mhz" | "ghz" | "thz" => options.scale = Scale::from_str(token)?,
            "ri" | "ma" | "db" => options.format = ComplexNumberType::from_str(token)?,
            "s" => (),
            "y" | "z" | "g" | "h" => {
                return Err(ConversionError::format(
                    line,
                    format!(
                        "file holds {}-parameters, S-parameters are required",
                        token.to_uppercase()
                    ),
                ));
            }
            "r" => {
                let val = tokens.next().ok_or_else(|| {
                    ConversionError::format(line, "option line 'R' has no value")
                })?;
                let z0 = parse_number(val, line, "reference impedance")?;
                if z0 <= 0.0 {
                    return Err(ConversionError::format(
                        line,
                        format!("reference impedance {} is not positive", z0),
                    ));
                }
                options.z0 = z0;
            }
            _ => {
                return Err(ConversionError::format(
                    line,
                    format!("unknown option line token '{}'", token),
                ));
            }
        }
    }

    Ok(options)
}

/// Which part of the S matrix a record holds, from `[Matrix Format]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum MatrixFormat {
    #[default]
    Full,
    Lower,
    Upper,
}

impl MatrixFormat {
    fn parse(value: &str, line: usize) -> Result<MatrixFormat, ConversionError> {
        match value.to_lowercase().as_str() {
            "full" => Ok(MatrixFormat::Full),
            "lower" => Ok(MatrixFormat::Lower),
            "upper" => Ok(MatrixFormat::Upper),
            _ => Err(ConversionError::format(
                line,
                format!("invalid matrix format '{}'", value),
            )),
        }
    }

    // complex values per frequency point
    fn nvalues(&self, nports: usize) -> usize {
        match self {
            MatrixFormat::Full => nports * nports,
            MatrixFormat::Lower | MatrixFormat::Upper => nports * (nports + 1) / 2,
        }
    }
}

fn decode_point(
    values: &[f64],
    nports: usize,
    format: ComplexNumberType,
    matrix: MatrixFormat,
    order_21_12: bool,
) -> Vec<Complex64> {
    let mut pairs = values
        .chunks_exact(2)
        .map(|pair| format.parse(pair[0], pair[1]));

    match matrix {
        MatrixFormat::Full => {
            let mut point: Vec<Complex64> = pairs.collect();
            // 2-port records list S11 S21 S12 S22 unless told otherwise
            if nports == 2 && order_21_12 {
                point.swap(1, 2);
            }
            point
        }
        MatrixFormat::Lower | MatrixFormat::Upper => {
            // reciprocal network, the missing triangle mirrors the given one
            let mut point = vec![Complex64::ZERO; nports * nports];
            for i in 0..nports {
                let cols = match matrix {
                    MatrixFormat::Lower => 0..i + 1,
                    _ => i..nports,
                };
                for j in cols {
                    let val = pairs.next().unwrap_or_default();
                    point[i * nports + j] = val;
                    point[j * nports + i] = val;
                }
            }
            point
        }
    }
}

// Reference impedances of all ports; this crate needs them to agree
fn common_reference(values: &[f64], line: usize) -> Result<f64, ConversionError> {
    let first = values[0];
    if values.iter().any(|&x| x != first) {
        return Err(ConversionError::format(
            line,
            format!(
                "per-port reference impedances {:?} differ, a single system impedance is required",
                values
            ),
        ));
    }
    if first <= 0.0 {
        return Err(ConversionError::format(
            line,
            format!("reference impedance {} is not positive", first),
        ));
    }
    Ok(first)
}

/// Read a Touchstone file, taking the port count from its `.sNp` extension.
pub fn read_touchstone(path: &Path) -> Result<Touchstone, ConversionError> {
    let file = File::open(path)
        .map_err(|e| ConversionError::Io(format!("cannot open {:?}: {}", path, e)))?;
    tracing::debug!("Reading Touchstone file {:?}", path);
    read_touchstone_from(BufReader::new(file), touchstone_ports(path))
}

/// Read Touchstone content from a stream.
///
/// `nports` is the port count implied by the file name, if known; a
/// `[Number of Ports]` keyword overrides it and 1 is assumed otherwise.
/// Bytes that are not UTF-8 are replaced, so they only fail a line that
/// must hold numbers.
pub fn read_touchstone_from<R: BufRead>(
    mut reader: R,
    nports: Option<usize>,
) -> Result<Touchstone, ConversionError> {
    let re_keyword = Regex::new(r"^\[\s*([^\]]+?)\s*\]\s*(.*)$").expect("Invalid regex!");

    let mut nports = nports;
    let mut options: Option<OptionLine> = None;
    let mut matrix = MatrixFormat::Full;
    let mut order_21_12 = true;
    let mut data_section = false;
    let mut comments = String::new();

    // `[Reference]` values may continue on the lines after the keyword
    let mut reference: Vec<f64> = vec![];
    let mut reference_line = 0;
    let mut reference_pending = false;

    let mut record: Vec<f64> = vec![];
    let mut record_line = 0;
    let mut record_len = 0;
    let mut freq_tmp: Vec<f64> = vec![];
    let mut data: Vec<Vec<Complex64>> = vec![];
    let mut line_no = 0;
    let mut buf: Vec<u8> = vec![];

    'lines: loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = String::from_utf8_lossy(&buf);
        let (content, comment) = match line.split_once('!') {
            Some((content, comment)) => (content.trim(), Some(comment.trim())),
            None => (line.trim(), None),
        };

        if let Some(comment) = comment {
            if !data_section && !comment.is_empty() {
                if !comments.is_empty() {
                    comments += "\n";
                }
                comments += comment;
            }
        }
        if content.is_empty() {
            continue;
        }

        if reference_pending && !content.starts_with('[') && !content.starts_with('#') {
            for token in content.split_whitespace() {
                reference.push(parse_number(token, line_no, "reference impedance")?);
            }
            reference_pending = reference.len() < nports.unwrap_or(1);
            continue;
        }
        reference_pending = false;

        if let Some(caps) = re_keyword.captures(content) {
            let value = caps[2].trim();
            match caps[1].to_lowercase().as_str() {
                "number of ports" => {
                    let n = value.parse::<usize>().map_err(|_| {
                        ConversionError::format(line_no, format!("invalid port count '{}'", value))
                    })?;
                    nports = Some(n);
                }
                "two-port data order" => match value {
                    "21_12" => order_21_12 = true,
                    "12_21" => order_21_12 = false,
                    _ => {
                        return Err(ConversionError::format(
                            line_no,
                            format!("invalid two-port data order '{}'", value),
                        ));
                    }
                },
                "matrix format" => matrix = MatrixFormat::parse(value, line_no)?,
                "reference" => {
                    reference.clear();
                    reference_line = line_no;
                    for token in value.split_whitespace() {
                        reference.push(parse_number(token, line_no, "reference impedance")?);
                    }
                    reference_pending = reference.len() < nports.unwrap_or(1);
                }
                "noise data" => {
                    tracing::warn!("Skipping noise parameters from line {}", line_no);
                    break;
                }
                "end" => break,
                keyword => tracing::debug!("Ignoring Touchstone keyword [{}]", keyword),
            }
            continue;
        }

        if content.starts_with('#') {
            if options.is_some() {
                tracing::warn!("Ignoring option line {}, only the first one counts", line_no);
            } else {
                options = Some(parse_option_line(content, line_no)?);
            }
            continue;
        }

        //
        // network data
        //
        let ports = nports.unwrap_or(1);
        if !(1..=2).contains(&ports) {
            return Err(ConversionError::format(
                line_no,
                format!("{}-port data is not supported, only 1-port and 2-port", ports),
            ));
        }
        data_section = true;
        let OptionLine { scale, format, .. } = *options.get_or_insert_with(OptionLine::default);
        record_len = 1 + 2 * matrix.nvalues(ports);

        for token in content.split_whitespace() {
            if record.is_empty() {
                let f = parse_number(token, line_no, "frequency")?;
                // 2-port noise parameters follow the network data with a reset frequency
                if ports == 2 && freq_tmp.last().is_some_and(|&last| f <= last) {
                    tracing::warn!(
                        "Frequency drops at line {}, skipping noise parameters",
                        line_no
                    );
                    break 'lines;
                }
                if f <= 0.0 {
                    return Err(ConversionError::format(
                        line_no,
                        format!("frequency {} is not positive", f),
                    ));
                }
                if !scale.unscale(f).is_finite() {
                    return Err(ConversionError::format(
                        line_no,
                        format!("frequency {} {} overflows", f, scale),
                    ));
                }
                record_line = line_no;
                record.push(f);
            } else {
                record.push(parse_number(token, line_no, "value")?);
            }

            if record.len() == record_len {
                freq_tmp.push(record[0]);
                data.push(decode_point(&record[1..], ports, format, matrix, order_21_12));
                record.clear();
            }
        }
    }

    let nports = nports.unwrap_or(1);
    if !record.is_empty() {
        return Err(ConversionError::format(
            record_line,
            format!(
                "incomplete record: expected {} values, found {}",
                record_len,
                record.len()
            ),
        ));
    }
    if data.is_empty() {
        return Err(ConversionError::format(line_no, "file holds no network data"));
    }

    let mut options = options.unwrap_or_default();
    if !reference.is_empty() {
        if reference.len() != nports {
            return Err(ConversionError::format(
                reference_line,
                format!(
                    "[Reference] lists {} impedances for {} ports",
                    reference.len(),
                    nports
                ),
            ));
        }
        options.z0 = common_reference(&reference, reference_line)?;
    }

    let freq = Frequency::from_vec(freq_tmp, options.scale);
    tracing::debug!(
        "Read {} points of {}-port {} data, R = {} ohm",
        data.len(),
        nports,
        options.format,
        options.z0
    );

    Ok(Touchstone {
        nports,
        scale: options.scale,
        format: options.format,
        z0: options.z0,
        comments,
        freq,
        data,
    })
}
