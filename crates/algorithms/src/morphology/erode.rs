//! Binary morphological erosion
//!
//! Shrinks the set region of a 0/1 mask: a pixel survives only if the
//! structuring element fits entirely inside the set region around it.

use ndarray::Array2;
use rayon::prelude::*;
use viridia_core::raster::Raster;
use viridia_core::{Algorithm, Error, Result};

use super::element::StructuringElement;

/// Parameters for binary erosion
#[derive(Debug, Clone, Default)]
pub struct ErodeParams {
    /// Structuring element shape
    pub element: StructuringElement,
}

/// Erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = Raster<u8>;
    type Output = Raster<u8>;
    type Params = ErodeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Binary erosion (keep pixels where the structuring element fits in the set region)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        erode(&input, &params.element)
    }
}

/// Erode a binary mask.
///
/// A pixel stays set only if every structuring-element offset lands on a
/// set (nonzero) pixel. Reads beyond the raster edge count as set, so
/// regions touching the border do not erode from outside.
pub fn erode(mask: &Raster<u8>, element: &StructuringElement) -> Result<Raster<u8>> {
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

                let mut all_set = true;
                for &(dr, dc) in &offsets {
                    let nr = r + dr;
                    let nc = c + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    if grid[[nr as usize, nc as usize]] == 0 {
                        all_set = false;
                        break;
                    }
                }

                if all_set {
                    *out = 1;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn make_mask(rows: usize, cols: usize) -> Raster<u8> {
        Raster::new(rows, cols)
    }

    #[test]
    fn test_erode_removes_single_pixel() {
        let mut mask = make_mask(7, 7);
        mask.set(3, 3, 1).unwrap();

        let result = erode(&mask, &StructuringElement::Square(1)).unwrap();
        assert!(result.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_erode_keeps_block_interior() {
        let mut mask = make_mask(9, 9);
        for r in 2..7 {
            for c in 2..7 {
                mask.set(r, c, 1).unwrap();
            }
        }

        let result = erode(&mask, &StructuringElement::Square(1)).unwrap();
        // 5x5 block erodes to its 3x3 interior
        for r in 3..6 {
            for c in 3..6 {
                assert_eq!(result.get(r, c).unwrap(), 1, "({}, {}) should survive", r, c);
            }
        }
        assert_eq!(result.get(2, 2).unwrap(), 0);
        assert_eq!(result.get(2, 4).unwrap(), 0);
        assert_eq!(result.get(6, 6).unwrap(), 0);
    }

    #[test]
    fn test_erode_full_mask_stays_full() {
        let mask = Raster::filled(6, 6, 1u8);
        let result = erode(&mask, &StructuringElement::Square(1)).unwrap();
        // Border reads count as set, so a full mask is unchanged
        assert!(result.data().iter().all(|&v| v == 1));
    }

    #[test]
    fn test_erode_region_touching_border() {
        let mut mask = make_mask(6, 6);
        for r in 0..3 {
            for c in 0..6 {
                mask.set(r, c, 1).unwrap();
            }
        }

        let result = erode(&mask, &StructuringElement::Square(1)).unwrap();
        // Top edge survives; the interior boundary at row 2 erodes
        assert_eq!(result.get(0, 3).unwrap(), 1);
        assert_eq!(result.get(1, 3).unwrap(), 1);
        assert_eq!(result.get(2, 3).unwrap(), 0);
    }
}
