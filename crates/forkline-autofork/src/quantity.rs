//! Quantity halving
//!
//! Understands a leading integer, decimal, fraction (`1/2`) or mixed
//! number (`1 1/2`); anything after the number is kept verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(\d+)\s+(\d+)/(\d+)|(\d+)/(\d+)|(\d*\.\d+|\d+))(.*)$")
        .expect("amount pattern is valid")
});

const FRACTION_DENOMINATORS: [u32; 4] = [2, 3, 4, 8];
const EPSILON: f64 = 1e-6;

fn capture_f64(caps: &regex::Captures<'_>, i: usize) -> Option<f64> {
    caps.get(i).and_then(|m| m.as_str().parse().ok())
}

/// Parse the leading amount; returns the value, whether it was written as
/// a decimal, and the trailing text
#[must_use]
pub fn parse_amount(quantity: &str) -> Option<(f64, bool, &str)> {
    let caps = LEADING_AMOUNT.captures(quantity)?;
    let rest = caps.get(7).map_or("", |m| m.as_str());

    let (value, decimal) = if caps.get(1).is_some() {
        let whole = capture_f64(&caps, 1)?;
        let (num, den) = (capture_f64(&caps, 2)?, capture_f64(&caps, 3)?);
        if den == 0.0 {
            return None;
        }
        (whole + num / den, false)
    } else if caps.get(4).is_some() {
        let (num, den) = (capture_f64(&caps, 4)?, capture_f64(&caps, 5)?);
        if den == 0.0 {
            return None;
        }
        (num / den, false)
    } else {
        let raw = caps.get(6)?.as_str();
        (raw.parse().ok()?, raw.contains('.'))
    };
    Some((value, decimal, rest))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_fraction(value: f64) -> String {
    let whole = value.floor();
    let frac = value - whole;
    if frac < EPSILON {
        return format!("{}", whole as u64);
    }
    for den in FRACTION_DENOMINATORS {
        let scaled = frac * f64::from(den);
        if (scaled - scaled.round()).abs() < EPSILON {
            let num = scaled.round() as u64;
            return if whole < EPSILON {
                format!("{num}/{den}")
            } else {
                format!("{} {num}/{den}", whole as u64)
            };
        }
    }
    format_decimal(value)
}

fn format_decimal(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Halve a quantity string; `None` when it has no leading number
#[must_use]
pub fn halve(quantity: &str) -> Option<String> {
    let (value, decimal, rest) = parse_amount(quantity)?;
    let half = value / 2.0;
    let amount = if decimal { format_decimal(half) } else { format_fraction(half) };
    Some(format!("{amount}{rest}"))
}
