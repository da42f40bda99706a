//! Scene-classification masking
//!
//! Decodes the scene classification band into a combined validity mask
//! for a set of requested class groups. The excluded region is grown by
//! a safety buffer because the upstream classifier is known to miss
//! pixels at class boundaries (thin cloud edges in particular).
//!
//! Internally the mask is built with 1 = excluded; the public result is
//! inverted to keep semantics: **1 = valid pixel, 0 = excluded**.

use viridia_core::raster::Raster;
use viridia_core::scene::MaskClass;
use viridia_core::{Algorithm, Error, Result};

use crate::morphology::{dilate, StructuringElement};

/// Default safety-buffer half-width in reference-grid pixels
pub const DEFAULT_BUFFER_HALF_WIDTH: usize = 20;

/// Parameters for validity mask construction
#[derive(Debug, Clone)]
pub struct MaskParams {
    /// Class groups whose pixels are excluded
    pub classes: Vec<MaskClass>,
    /// Safety buffer grown around the excluded region; `None` disables it
    pub buffer: Option<StructuringElement>,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            classes: vec![MaskClass::Cloud],
            buffer: Some(StructuringElement::Square(DEFAULT_BUFFER_HALF_WIDTH)),
        }
    }
}

/// Validity-mask algorithm
#[derive(Debug, Clone, Default)]
pub struct SceneMask;

impl Algorithm for SceneMask {
    type Input = Raster<u16>;
    type Output = Raster<u8>;
    type Params = MaskParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "SceneMask"
    }

    fn description(&self) -> &'static str {
        "Build a buffered validity mask from the scene classification band"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        validity_mask(&input, &params)
    }
}

/// Build a validity mask from a scene classification map.
///
/// Every pixel whose code belongs to any requested class group is
/// excluded, the excluded region is grown by the safety buffer, and the
/// result is inverted so callers read 1 = keep, 0 = excluded. The
/// classification map itself is never modified.
///
/// An empty class list excludes nothing and yields an all-valid mask.
pub fn validity_mask(scl: &Raster<u16>, params: &MaskParams) -> Result<Raster<u8>> {
    let excluded = exclusion_mask(scl, &params.classes);

    let buffered = match &params.buffer {
        Some(element) => dilate(&excluded, element)?,
        None => excluded,
    };

    Ok(invert(&buffered))
}

/// Blank out excluded pixels of a value grid.
///
/// Pixels where the validity mask is 0 are set to NaN so downstream
/// thresholding never sees them. Grid and mask must share a shape.
pub fn apply_mask(values: &Raster<f64>, mask: &Raster<u8>) -> Result<Raster<f64>> {
    if values.shape() != mask.shape() {
        let (er, ec) = values.shape();
        let (ar, ac) = mask.shape();
        return Err(Error::SizeMismatch { er, ec, ar, ac });
    }

    let mut out = values.clone();
    out.set_nodata(Some(f64::NAN));
    for ((r, c), &keep) in mask.data().indexed_iter() {
        if keep == 0 {
            out.data_mut()[[r, c]] = f64::NAN;
        }
    }
    Ok(out)
}

/// Internal mask with 1 = excluded, before buffering and inversion
fn exclusion_mask(scl: &Raster<u16>, classes: &[MaskClass]) -> Raster<u8> {
    // Codes above the classification table never match any group
    let mut lut = [false; 12];
    for class in classes {
        for &code in class.codes() {
            lut[code as usize] = true;
        }
    }

    let (rows, cols) = scl.shape();
    let mut mask = scl.with_same_meta::<u8>(rows, cols);
    for ((r, c), &code) in scl.data().indexed_iter() {
        let code = code as usize;
        if code < lut.len() && lut[code] {
            mask.data_mut()[[r, c]] = 1;
        }
    }
    mask
}

fn invert(mask: &Raster<u8>) -> Raster<u8> {
    let mut out = mask.clone();
    out.data_mut().mapv_inplace(|v| u8::from(v == 0));
    out
}
