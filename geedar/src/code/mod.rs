//! Processing code decoding.
//!
//! A processing code packs a whole retrieval plan into one integer laid out
//! as `PPP SS RR A`:
//!
//! | Digits | Field                        |
//! |--------|------------------------------|
//! | 0..3   | product                      |
//! | 3..5   | pixel-selection algorithm    |
//! | 5..7   | estimation algorithm         |
//! | last   | reducer                      |
//!
//! ```
//! use geedar::code::decode;
//!
//! let plan = decode(90114001).unwrap();
//! assert_eq!(plan.product_id(), 901);
//! assert_eq!(plan.pixel_algo_id(), 14);
//! assert_eq!(plan.estimation_algo_id(), 0);
//! assert_eq!(plan.reducer().name, "median");
//! ```

mod parse;
mod plan;

pub use parse::parse_codes;
pub use plan::ProcessingPlan;

use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::registry;

/// Minimum number of digits in a processing code.
pub const MIN_CODE_DIGITS: usize = 8;

/// The sub-field of a processing code that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeField {
    Product,
    PixelAlgorithm,
    EstimationAlgorithm,
    Reducer,
}

impl fmt::Display for CodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeField::Product => write!(f, "product"),
            CodeField::PixelAlgorithm => write!(f, "pixel-selection algorithm"),
            CodeField::EstimationAlgorithm => write!(f, "estimation algorithm"),
            CodeField::Reducer => write!(f, "reducer"),
        }
    }
}

/// Processing code validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Code has fewer than [`MIN_CODE_DIGITS`] digits
    #[error("processing code '{0}' must have at least {MIN_CODE_DIGITS} digits")]
    TooShort(String),

    /// A list entry is not an unsigned integer
    #[error("processing code '{0}' is not an unsigned integer")]
    NotNumeric(String),

    /// A sub-field is absent from its registry
    #[error("processing code {code}: unknown {field} id {value}")]
    UnknownId {
        code: u64,
        field: CodeField,
        value: u16,
    },

    /// No code was given at all
    #[error("no processing code was provided")]
    Empty,
}

/// How [`decode_all`] treats invalid codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecMode {
    /// The first invalid code fails the whole list.
    #[default]
    Strict,
    /// Invalid codes are logged and skipped.
    Lenient,
}

/// Decodes and validates a processing code.
pub fn decode(code: u64) -> Result<ProcessingPlan, CodeError> {
    let digits = code.to_string();
    if digits.len() < MIN_CODE_DIGITS {
        return Err(CodeError::TooShort(digits));
    }

    // All slices are ASCII digits, so the parses below cannot fail.
    let field = |range: std::ops::Range<usize>| -> u16 {
        digits[range].parse().unwrap_or(u16::MAX)
    };
    let product_id = field(0..3);
    let pixel_id = field(3..5);
    let estimation_id = field(5..7);
    let reducer_id = field(digits.len() - 1..digits.len());

    let unknown = |field, value| CodeError::UnknownId { code, field, value };

    let product = registry::product(product_id).ok_or(unknown(CodeField::Product, product_id))?;
    let pixel_algo = registry::pixel_algorithm(pixel_id as u8)
        .ok_or(unknown(CodeField::PixelAlgorithm, pixel_id))?;
    let estimation_algo = registry::estimation_algorithm(estimation_id as u8)
        .ok_or(unknown(CodeField::EstimationAlgorithm, estimation_id))?;
    let reducer =
        registry::reducer(reducer_id as u8).ok_or(unknown(CodeField::Reducer, reducer_id))?;

    Ok(ProcessingPlan::new(
        code,
        product,
        pixel_algo,
        estimation_algo,
        reducer,
    ))
}

/// Packs the four ids into a processing code.
///
/// Only used to build codes for listings and tests; a run never re-encodes.
pub fn encode(product_id: u16, pixel_algo_id: u8, estimation_algo_id: u8, reducer_id: u8) -> u64 {
    u64::from(product_id) * 100_000
        + u64::from(pixel_algo_id) * 1_000
        + u64::from(estimation_algo_id) * 10
        + u64::from(reducer_id)
}

/// Decodes a list of codes.
///
/// Duplicate codes are dropped, keeping the first occurrence.
pub fn decode_all(codes: &[u64], mode: CodecMode) -> Result<Vec<ProcessingPlan>, CodeError> {
    if codes.is_empty() {
        return Err(CodeError::Empty);
    }

    let mut plans: Vec<ProcessingPlan> = Vec::with_capacity(codes.len());
    for &code in codes {
        if plans.iter().any(|p| p.code() == code) {
            warn!(code, "Duplicate processing code ignored");
            continue;
        }
        match decode(code) {
            Ok(plan) => plans.push(plan),
            Err(e) if mode == CodecMode::Lenient => {
                warn!(code, error = %e, "Invalid processing code skipped");
            }
            Err(e) => return Err(e),
        }
    }

    if plans.is_empty() {
        return Err(CodeError::Empty);
    }
    Ok(plans)
}
