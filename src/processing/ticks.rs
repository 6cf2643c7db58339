/// Axis label formatter whose precision follows the spread of the data it was
/// built from. The range is captured once; every label uses the same rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledTickFormatter {
    /// `None` when the sample had no finite values.
    range: Option<f64>,
}

impl ScaledTickFormatter {
    pub fn new(samples: &[f64]) -> Self {
        Self { range: finite_range(samples) }
    }

    pub fn range(&self) -> Option<f64> {
        self.range
    }

    pub fn format(&self, value: f64) -> String {
        let Some(range) = self.range else {
            return plain_string(value);
        };
        if !value.is_finite() {
            return plain_string(value);
        }

        let magnitude = value.abs();
        if magnitude >= 1e6 || (range > 0.0 && magnitude >= 1e4) {
            return to_exponential(value, 1);
        }
        if magnitude < 1e-3 && value != 0.0 {
            return to_exponential(value, 1);
        }

        let decimals = if range < 0.1 {
            3
        } else if range < 10.0 {
            2
        } else if range < 100.0 {
            1
        } else {
            0
        };
        to_fixed(value, decimals)
    }
}

/// Number of ticks to request for an axis spanning `samples`.
pub fn suggested_tick_count(samples: &[f64]) -> usize {
    match finite_range(samples) {
        None => 5,
        Some(r) if r < 10.0 => 8,
        Some(r) if r < 100.0 => 6,
        Some(r) if r < 1000.0 => 5,
        Some(_) => 4,
    }
}

fn finite_range(samples: &[f64]) -> Option<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in samples.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some(max - min)
    } else {
        None
    }
}

fn non_finite_name(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Infinity")
    } else if value == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}

/// Shortest round-trip rendering, switching to exponent form for very large
/// and very small magnitudes.
pub fn plain_string(value: f64) -> String {
    if let Some(name) = non_finite_name(value) {
        return name.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        signed_exponent(format!("{value:e}"))
    } else {
        format!("{value}")
    }
}

/// Exponent notation with an explicit exponent sign, e.g. `2.5e+4`.
/// Exact mantissa ties round away from zero.
pub fn to_exponential(value: f64, decimals: usize) -> String {
    if let Some(name) = non_finite_name(value) {
        return name.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && is_exponent_tie(magnitude, decimals) {
        // The next double up lies past the tie, so it rounds upward.
        let above = f64::from_bits(magnitude.to_bits() + 1);
        let sign = if value < 0.0 { "-" } else { "" };
        return signed_exponent(format!("{sign}{above:.decimals$e}"));
    }
    signed_exponent(format!("{value:.decimals$e}"))
}

/// True when the exact decimal expansion of `magnitude` stops at a 5 right
/// after the kept mantissa digits.
fn is_exponent_tie(magnitude: f64, decimals: usize) -> bool {
    // Long enough for the full expansion of any double.
    let exact = format!("{magnitude:.800e}");
    let mantissa = exact.split_once('e').map_or(exact.as_str(), |(m, _)| m);
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    digits.get(decimals + 1) == Some(&b'5') && digits.iter().skip(decimals + 2).all(|&d| d == b'0')
}

fn signed_exponent(formatted: String) -> String {
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => formatted,
    }
}

/// Fixed-point rendering that rounds exact ties away from zero.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if let Some(name) = non_finite_name(value) {
        return name.to_string();
    }
    // Negative zero prints without its sign.
    let value = if value == 0.0 { 0.0 } else { value };

    let scale = 10f64.powi(decimals as i32);
    let doubled = value.abs() * 2.0 * scale;
    let exact = value.abs().mul_add(2.0 * scale, -doubled) == 0.0;
    let is_tie = exact && doubled.fract() == 0.0 && doubled % 2.0 == 1.0;

    if is_tie {
        let rounded = (value * scale).round() / scale;
        format!("{rounded:.decimals$}")
    } else {
        format!("{value:.decimals$}")
    }
}
