//! Canonicalization and validation of user-typed amounts.
//!
//! The canonical grammar is `digits(.digits)?`. While the user is typing,
//! a terminal period (`"123."`) is kept and reported as [`AmountValidation::Incomplete`],
//! which callers must not surface as an error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountLimits {
    pub max_int_digits: usize,
    pub max_frac_digits: usize,
}

impl Default for AmountLimits {
    fn default() -> Self {
        Self {
            max_int_digits: 12,
            max_frac_digits: 6,
        }
    }
}

impl AmountLimits {
    /// Longest canonical text these limits allow, e.g. for an input `maxlength`.
    pub fn max_input_length(&self) -> usize {
        let frac = if self.max_frac_digits > 0 {
            1 + self.max_frac_digits
        } else {
            0
        };
        self.max_int_digits + frac
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "lowercase")]
pub enum AmountValidation {
    Ok,
    Empty,
    Incomplete,
    Invalid,
}

impl AmountValidation {
    pub fn is_ok(&self) -> bool {
        matches!(self, AmountValidation::Ok)
    }

    /// Whether the state should be shown to the user as an error.
    pub fn is_error_visible(&self) -> bool {
        matches!(self, AmountValidation::Empty | AmountValidation::Invalid)
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            AmountValidation::Empty => Some("Enter an amount."),
            AmountValidation::Invalid => Some("Invalid amount."),
            AmountValidation::Ok | AmountValidation::Incomplete => None,
        }
    }
}

pub fn normalize(raw: &str, limits: &AmountLimits) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let (int_raw, frac_raw, has_dot) = match cleaned.split_once('.') {
        Some((int, rest)) => (int, rest.replace('.', ""), true),
        None => (cleaned.as_str(), String::new(), false),
    };

    let int_trimmed = int_raw.trim_start_matches('0');
    let int_part: String = int_trimmed.chars().take(limits.max_int_digits).collect();
    let frac_part: String = frac_raw.chars().take(limits.max_frac_digits).collect();

    let int_or_zero = if int_part.is_empty() { "0" } else { &int_part };

    if !frac_part.is_empty() {
        format!("{int_or_zero}.{frac_part}")
    } else if has_dot && limits.max_frac_digits > 0 {
        format!("{int_or_zero}.")
    } else if !int_part.is_empty() {
        int_part
    } else if !int_raw.is_empty() || has_dot {
        "0".to_string()
    } else {
        String::new()
    }
}

pub fn validate(text: &str) -> AmountValidation {
    if text.is_empty() {
        return AmountValidation::Empty;
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match frac_part {
        _ if !all_digits(int_part) => AmountValidation::Invalid,
        None => AmountValidation::Ok,
        Some("") => AmountValidation::Incomplete,
        Some(frac) if all_digits(frac) => AmountValidation::Ok,
        Some(_) => AmountValidation::Invalid,
    }
}

/// True when `text` matches `digits(.digits)?`.
pub fn is_canonical(text: &str) -> bool {
    validate(text).is_ok()
}
