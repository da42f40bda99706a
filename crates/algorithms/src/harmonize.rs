//! Band resolution harmonization
//!
//! Sentinel-2 bands ship at three ground sample distances. Analysis over
//! multiple bands needs them all on the finest (10 m) grid, so medium and
//! coarse bands are upsampled by integer pixel replication. Replication
//! preserves hard per-pixel values, which keeps categorical bands such as
//! the scene classification valid after resampling.

use ndarray::Array2;
use viridia_core::band::ResolutionClass;
use viridia_core::raster::{Raster, RasterElement};
use viridia_core::{Algorithm, Error, Result};

/// Parameters for resolution harmonization
#[derive(Debug, Clone)]
pub struct HarmonizeParams {
    /// Native resolution class of the input band
    pub resolution: ResolutionClass,
}

impl Default for HarmonizeParams {
    fn default() -> Self {
        Self {
            resolution: ResolutionClass::Fine,
        }
    }
}

/// Harmonization algorithm
#[derive(Debug, Clone, Default)]
pub struct Harmonize;

impl Algorithm for Harmonize {
    /// Raw band plus the reference grid shape it must reach
    type Input = (Raster<f64>, (usize, usize));
    type Output = Raster<f64>;
    type Params = HarmonizeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Harmonize"
    }

    fn description(&self) -> &'static str {
        "Upsample a band to the reference grid by integer pixel replication"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (band, reference_shape) = input;
        harmonize(&band, params.resolution, reference_shape)
    }
}

/// Upsample a band to the reference grid, checking the declared resolution.
///
/// The raw shape times the class factor must equal the reference shape
/// exactly; anything else is a fatal input error, never silently padded
/// or cropped. The input raster is not modified.
pub fn harmonize<T: RasterElement>(
    band: &Raster<T>,
    resolution: ResolutionClass,
    reference_shape: (usize, usize),
) -> Result<Raster<T>> {
    let factor = resolution.factor();
    let (rows, cols) = band.shape();
    let (ref_rows, ref_cols) = reference_shape;

    if rows * factor != ref_rows || cols * factor != ref_cols {
        return Err(Error::ResolutionMismatch {
            rows,
            cols,
            factor,
            ref_rows,
            ref_cols,
        });
    }

    upsample(band, factor)
}

/// Upsample a raster by replicating each pixel `factor` times along both
/// axes. A factor of 1 returns an identical copy.
pub fn upsample<T: RasterElement>(band: &Raster<T>, factor: usize) -> Result<Raster<T>> {
    if factor == 0 {
        return Err(Error::InvalidParameter {
            name: "factor",
            value: "0".to_string(),
            reason: "replication factor must be at least 1".to_string(),
        });
    }

    if factor == 1 {
        return Ok(band.clone());
    }

    let (rows, cols) = band.shape();
    let src = band.data();
    let data = Array2::from_shape_fn((rows * factor, cols * factor), |(r, c)| {
        src[[r / factor, c / factor]]
    });

    let mut output = Raster::from_array(data);
    output.set_transform(band.transform().upsampled(factor));
    output.set_nodata(band.nodata());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use viridia_core::GeoTransform;

    fn make_band(rows: usize, cols: usize) -> Raster<f64> {
        let data: Vec<f64> = (0..rows * cols).map(|i| i as f64).collect();
        let mut band = Raster::from_vec(data, rows, cols).unwrap();
        band.set_transform(GeoTransform::new(0.0, rows as f64 * 20.0, 20.0, -20.0));
        band
    }

    #[test]
    fn test_fine_band_is_unchanged() {
        let band = make_band(6, 6);
        let result = harmonize(&band, ResolutionClass::Fine, (6, 6)).unwrap();

        assert_eq!(result.shape(), (6, 6));
        for r in 0..6 {
            for c in 0..6 {
                assert_eq!(result.get(r, c).unwrap(), band.get(r, c).unwrap());
            }
        }
    }

    #[test]
    fn test_medium_band_replicates_2x2_blocks() {
        let band = make_band(3, 4);
        let result = harmonize(&band, ResolutionClass::Medium, (6, 8)).unwrap();

        assert_eq!(result.shape(), (6, 8));
        for r in 0..6 {
            for c in 0..8 {
                assert_eq!(
                    result.get(r, c).unwrap(),
                    band.get(r / 2, c / 2).unwrap(),
                    "block at ({}, {}) must equal its source pixel",
                    r,
                    c
                );
            }
        }
    }

    #[test]
    fn test_coarse_band_replicates_6x6_blocks() {
        let band = make_band(2, 2);
        let result = harmonize(&band, ResolutionClass::Coarse, (12, 12)).unwrap();

        assert_eq!(result.shape(), (12, 12));
        assert_eq!(result.get(0, 5).unwrap(), band.get(0, 0).unwrap());
        assert_eq!(result.get(5, 5).unwrap(), band.get(0, 0).unwrap());
        assert_eq!(result.get(6, 0).unwrap(), band.get(1, 0).unwrap());
        assert_eq!(result.get(11, 11).unwrap(), band.get(1, 1).unwrap());
    }

    #[test]
    fn test_mismatched_reference_is_fatal() {
        let band = make_band(5, 5);
        let err = harmonize(&band, ResolutionClass::Medium, (12, 12)).unwrap_err();
        assert!(matches!(err, Error::ResolutionMismatch { .. }));
    }

    #[test]
    fn test_input_band_is_not_mutated() {
        let band = make_band(3, 3);
        let before = band.clone();
        let _ = harmonize(&band, ResolutionClass::Medium, (6, 6)).unwrap();

        for r in 0..3 {
            for c in 0..3 {
                assert_eq!(band.get(r, c).unwrap(), before.get(r, c).unwrap());
            }
        }
    }

    #[test]
    fn test_upsampled_transform_covers_same_extent() {
        let band = make_band(3, 3);
        let result = upsample(&band, 2).unwrap();

        assert_relative_eq!(result.cell_size(), 10.0, epsilon = 1e-10);
        let (min_x, min_y, max_x, max_y) = band.bounds();
        let (rmin_x, rmin_y, rmax_x, rmax_y) = result.bounds();
        assert_relative_eq!(min_x, rmin_x, epsilon = 1e-10);
        assert_relative_eq!(min_y, rmin_y, epsilon = 1e-10);
        assert_relative_eq!(max_x, rmax_x, epsilon = 1e-10);
        assert_relative_eq!(max_y, rmax_y, epsilon = 1e-10);
    }

    #[test]
    fn test_categorical_values_replicate_exactly() {
        let mut scl: Raster<u16> = Raster::new(2, 2);
        scl.set(0, 0, 4).unwrap();
        scl.set(0, 1, 9).unwrap();
        scl.set(1, 0, 6).unwrap();
        scl.set(1, 1, 11).unwrap();

        let result = harmonize(&scl, ResolutionClass::Medium, (4, 4)).unwrap();
        assert_eq!(result.get(0, 0).unwrap(), 4);
        assert_eq!(result.get(1, 1).unwrap(), 4);
        assert_eq!(result.get(0, 2).unwrap(), 9);
        assert_eq!(result.get(3, 0).unwrap(), 6);
        assert_eq!(result.get(2, 3).unwrap(), 11);
    }

    #[test]
    fn test_zero_factor_rejected() {
        let band = make_band(2, 2);
        assert!(upsample(&band, 0).is_err());
    }
}
