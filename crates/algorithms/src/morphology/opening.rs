//! Binary morphological opening (erosion followed by dilation)
//!
//! Removes set features smaller than the structuring element while
//! preserving the shape of larger regions. This is the noise-removal
//! half of the zone cleanup.

use viridia_core::raster::Raster;
use viridia_core::{Algorithm, Error, Result};

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Parameters for binary opening
#[derive(Debug, Clone, Default)]
pub struct OpeningParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Opening algorithm
#[derive(Debug, Clone, Default)]
pub struct Opening;

impl Algorithm for Opening {
    type Input = Raster<u8>;
    type Output = Raster<u8>;
    type Params = OpeningParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Opening"
    }

    fn description(&self) -> &'static str {
        "Binary opening (erosion then dilation) to remove small set features"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        opening(&input, &params.element)
    }
}

/// Perform binary opening on a mask.
///
/// Opening = erode then dilate. Never adds pixels that were not set in
/// the input.
pub fn opening(mask: &Raster<u8>, element: &StructuringElement) -> Result<Raster<u8>> {
    let eroded = erode(mask, element)?;
    dilate(&eroded, element)
}
