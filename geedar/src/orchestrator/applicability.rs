//! Plan applicability checks.

use thiserror::Error;

use crate::code::ProcessingPlan;

/// Why a plan cannot run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicabilityError {
    #[error("pixel-selection algorithm {algo} is not applicable to product {product}")]
    PixelAlgorithm { algo: u8, product: u16 },

    #[error("estimation algorithm {algo} needs bands missing from product {product}: {}", .missing.join(", "))]
    MissingBands {
        algo: u8,
        product: u16,
        missing: Vec<String>,
    },
}

/// Checks the plan's algorithms accept its product.
pub fn check_applicability(plan: &ProcessingPlan) -> Result<(), ApplicabilityError> {
    let product = plan.product();
    if !plan.pixel_algo().is_applicable_to(product.id) {
        return Err(ApplicabilityError::PixelAlgorithm {
            algo: plan.pixel_algo_id(),
            product: product.id,
        });
    }

    let missing: Vec<String> = plan
        .estimation_algo()
        .required_bands
        .iter()
        .filter(|band| !product.has_canonical(band))
        .map(|band| band.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ApplicabilityError::MissingBands {
            algo: plan.estimation_algo_id(),
            product: product.id,
            missing,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::decode;

    #[test]
    fn test_applicable_plan() {
        assert_eq!(check_applicability(&decode(90114001).unwrap()), Ok(()));
        assert_eq!(check_applicability(&decode(20109021).unwrap()), Ok(()));
    }

    #[test]
    fn test_pixel_algorithm_not_applicable() {
        // MOD3R only runs on MODIS-like products.
        assert_eq!(
            check_applicability(&decode(20102001).unwrap()),
            Err(ApplicabilityError::PixelAlgorithm {
                algo: 2,
                product: 201
            })
        );
    }

    #[test]
    fn test_estimation_needs_missing_bands() {
        // GPM has no optical bands.
        let err = check_applicability(&decode(90100051).unwrap()).unwrap_err();
        assert_eq!(
            err,
            ApplicabilityError::MissingBands {
                algo: 5,
                product: 901,
                missing: vec!["red".to_string()]
            }
        );
        assert!(err.to_string().contains("red"));
    }
}
