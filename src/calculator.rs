//! Dosage calculation
//!
//! Pure functions only. The store calls `compute_result` after every input
//! change; the CLI uses the same functions for one-shot calculations.
//!
//! ```text
//! dosage = (standard_amount / standard_volume) * target_volume
//! ```
//!
//! Number parsing is lenient about trailing text ("12ml" reads as 12) and
//! strict about everything else: empty text, text with no leading number,
//! and non-finite values all fail to parse.

use crate::storage::types::InputState;

/// The three inputs after parsing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DosageInputs {
    pub standard_amount: f64,
    pub standard_volume: f64,
    pub target_volume: f64,
}

impl DosageInputs {
    pub fn new(standard_amount: f64, standard_volume: f64, target_volume: f64) -> Self {
        Self {
            standard_amount,
            standard_volume,
            target_volume,
        }
    }

    /// Parse all three fields; `None` if any of them fails
    pub fn parse(input: &InputState) -> Option<Self> {
        Some(Self {
            standard_amount: parse_number(&input.standard_amount)?,
            standard_volume: parse_number(&input.standard_volume)?,
            target_volume: parse_number(&input.target_volume)?,
        })
    }

    /// Scale the label ratio to the target volume
    ///
    /// `None` when the standard volume is zero or the product overflows.
    pub fn dosage(&self) -> Option<f64> {
        // -0.0 == 0.0, so a typed "-0" is guarded too
        if self.standard_volume == 0.0 {
            return None;
        }

        let result = (self.standard_amount / self.standard_volume) * self.target_volume;
        result.is_finite().then_some(result)
    }
}

/// Derive the dosage from raw text inputs
pub fn compute_result(input: &InputState) -> Option<f64> {
    DosageInputs::parse(input)?.dosage()
}

/// Parse the leading number in `text`
///
/// Accepts `[+-]? digits? (. digits?)? ([eE][+-]? digits)?` after leading
/// whitespace, with at least one mantissa digit. Anything after the
/// longest such prefix is ignored. An exponent marker without digits is
/// left out of the prefix ("1.5e" reads as 1.5).
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Whether an edit should be let through to the store
///
/// Empty text is allowed (the user cleared the field); otherwise the text
/// must parse to a non-negative number.
pub fn is_acceptable_input(text: &str) -> bool {
    text.is_empty() || parse_number(text).map(|v| v >= 0.0).unwrap_or(false)
}

/// Render a dosage with two decimals
pub fn format_dose(value: f64) -> String {
    format!("{:.2}", value)
}
