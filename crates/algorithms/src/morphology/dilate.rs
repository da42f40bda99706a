//! Binary morphological dilation
//!
//! Grows the set region of a 0/1 mask by the structuring element.
//! Used both as the classification safety buffer and as half of the
//! closing operator.

use ndarray::Array2;
use rayon::prelude::*;
use viridia_core::raster::Raster;
use viridia_core::{Algorithm, Error, Result};

use super::element::StructuringElement;

/// Parameters for binary dilation
#[derive(Debug, Clone, Default)]
pub struct DilateParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = Raster<u8>;
    type Output = Raster<u8>;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Binary dilation (grow the set region by the structuring element)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate(&input, &params.element)
    }
}

/// Dilate a binary mask.
///
/// Every set (nonzero) input pixel stamps the structuring element onto
/// the output, so the operation only ever adds pixels. Reads beyond the
/// raster edge count as unset.
pub fn dilate(mask: &Raster<u8>, element: &StructuringElement) -> Result<Raster<u8>> {
    element.validate()?;

    let (rows, cols) = mask.shape();
    let offsets = element.offsets();
    let grid = mask.data();

    let output_data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let r = row as isize;
                let c = col as isize;

                for &(dr, dc) in &offsets {
                    let nr = r - dr;
                    let nc = c - dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    if grid[[nr as usize, nc as usize]] != 0 {
                        *out = 1;
                        break;
                    }
                }
            }

            row_data
        })
        .collect();

    build_mask(mask, rows, cols, output_data)
}

fn build_mask(
    template: &Raster<u8>,
    rows: usize,
    cols: usize,
    data: Vec<u8>,
) -> Result<Raster<u8>> {
    let mut output = template.with_same_meta::<u8>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}
