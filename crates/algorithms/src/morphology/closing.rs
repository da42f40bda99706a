//! Binary morphological closing (dilation followed by erosion)
//!
//! Fills gaps and holes smaller than the structuring element while
//! preserving the shape of larger regions. This is the gap-filling
//! half of the zone cleanup.

use viridia_core::raster::Raster;
use viridia_core::{Algorithm, Error, Result};

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Parameters for binary closing
#[derive(Debug, Clone, Default)]
pub struct ClosingParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Closing algorithm
#[derive(Debug, Clone, Default)]
pub struct Closing;

impl Algorithm for Closing {
    type Input = Raster<u8>;
    type Output = Raster<u8>;
    type Params = ClosingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Closing"
    }

    fn description(&self) -> &'static str {
        "Binary closing (dilation then erosion) to fill small gaps in the set region"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        closing(&input, &params.element)
    }
}

/// Perform binary closing on a mask.
///
/// Closing = dilate then erode. Never removes pixels that were set in
/// the input.
pub fn closing(mask: &Raster<u8>, element: &StructuringElement) -> Result<Raster<u8>> {
    let dilated = dilate(mask, element)?;
    erode(&dilated, element)
}
