//! Spectral vegetation indices
//!
//! Per-pixel vegetation condition grids computed from harmonized
//! reflectance bands. All functions operate on single-band rasters
//! (one band per raster) and produce f64 grids where pixels with an
//! undefined index value are NaN.

use ndarray::Array2;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

use viridia_core::band::{AlignedStack, BandId};
use viridia_core::raster::Raster;
use viridia_core::{Error, Result};

/// Enumeration of supported vegetation indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VegetationIndex {
    /// Normalized Difference Vegetation Index
    NDVI,
    /// Ratio Vegetation Index
    RVI,
    /// Soil Adjusted Vegetation Index
    SAVI,
    /// Enhanced Vegetation Index
    EVI,
}

impl VegetationIndex {
    /// Every supported index, in presentation order.
    pub const ALL: [VegetationIndex; 4] = [
        VegetationIndex::NDVI,
        VegetationIndex::RVI,
        VegetationIndex::SAVI,
        VegetationIndex::EVI,
    ];

    /// Lowercase name used on the command line and in output attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            VegetationIndex::NDVI => "ndvi",
            VegetationIndex::RVI => "rvi",
            VegetationIndex::SAVI => "savi",
            VegetationIndex::EVI => "evi",
        }
    }

    /// Bands the index reads from the harmonized stack.
    pub fn required_bands(&self) -> &'static [BandId] {
        match self {
            VegetationIndex::NDVI | VegetationIndex::RVI | VegetationIndex::SAVI => {
                &[BandId::B08, BandId::B04]
            }
            VegetationIndex::EVI => &[BandId::B08, BandId::B04, BandId::B02],
        }
    }

    /// Compute this index from a harmonized band stack using default
    /// coefficients.
    ///
    /// Fails with a missing-band error when the stack lacks one of the
    /// bands named by [`required_bands`](Self::required_bands).
    pub fn compute(&self, stack: &AlignedStack) -> Result<Raster<f64>> {
        let nir = stack.band(BandId::B08)?;
        let red = stack.band(BandId::B04)?;
        match self {
            VegetationIndex::NDVI => ndvi(nir, red),
            VegetationIndex::RVI => rvi(nir, red),
            VegetationIndex::SAVI => savi(nir, red, SaviParams::default()),
            VegetationIndex::EVI => {
                let blue = stack.band(BandId::B02)?;
                evi(nir, red, blue, EviParams::default())
            }
        }
    }
}

impl fmt::Display for VegetationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VegetationIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ndvi" => Ok(VegetationIndex::NDVI),
            "rvi" => Ok(VegetationIndex::RVI),
            "savi" => Ok(VegetationIndex::SAVI),
            "evi" => Ok(VegetationIndex::EVI),
            _ => Err(Error::UnknownIndex(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Result is in the range [-1, 1]. Pixels where the denominator is
/// near zero or either band is nodata are set to NaN.
///
/// # Arguments
/// * `band_a` - Numerator positive band
/// * `band_b` - Numerator negative band
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();
    let grid_a = band_a.data();
    let grid_b = band_b.data();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let a = grid_a[[row, col]];
                let b = grid_b[[row, col]];

                if is_nodata_f64(a, nodata_a) || is_nodata_f64(b, nodata_b) {
                    continue;
                }

                let sum = a + b;
                if sum.abs() < 1e-10 {
                    continue; // Avoid division by zero
                }

                row_data[col] = (a - b) / sum;
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

// ---------------------------------------------------------------------------
// NDVI
// ---------------------------------------------------------------------------

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Values range from -1 to 1:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
///
/// # Arguments
/// * `nir` - Near-infrared band (Sentinel-2 B08)
/// * `red` - Red band (Sentinel-2 B04)
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

// ---------------------------------------------------------------------------
// RVI
// ---------------------------------------------------------------------------

/// Ratio Vegetation Index (Jordan, 1969)
///
/// `RVI = NIR / Red`
///
/// Plain band ratio, not bounded to [-1, 1]. Dense canopy pushes the
/// ratio well above 1 while bare soil sits near it.
///
/// # Arguments
/// * `nir` - Near-infrared band
/// * `red` - Red band
pub fn rvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    check_dimensions(nir, red)?;

    let (rows, cols) = nir.shape();
    let nodata_nir = nir.nodata();
    let nodata_red = red.nodata();
    let grid_n = nir.data();
    let grid_r = red.data();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let n = grid_n[[row, col]];
                let r = grid_r[[row, col]];

                if is_nodata_f64(n, nodata_nir) || is_nodata_f64(r, nodata_red) {
                    continue;
                }

                if r.abs() < 1e-10 {
                    continue; // Avoid division by zero
                }

                row_data[col] = n / r;
            }
            row_data
        })
        .collect();

    build_output(nir, rows, cols, data)
}

// ---------------------------------------------------------------------------
// SAVI
// ---------------------------------------------------------------------------

/// Parameters for SAVI
#[derive(Debug, Clone)]
pub struct SaviParams {
    /// Soil brightness correction factor (0 = high vegetation, 1 = low vegetation)
    /// Default: 0.5
    pub l_factor: f64,
}

impl Default for SaviParams {
    fn default() -> Self {
        Self { l_factor: 0.5 }
    }
}

/// Soil Adjusted Vegetation Index (Huete, 1988)
///
/// `SAVI = ((NIR - Red) / (NIR + Red + L)) * (1 + L)`
///
/// Minimizes soil brightness influences on vegetation indices.
///
/// # Arguments
/// * `nir` - Near-infrared band
/// * `red` - Red band
/// * `params` - SAVI parameters (L factor)
pub fn savi(nir: &Raster<f64>, red: &Raster<f64>, params: SaviParams) -> Result<Raster<f64>> {
    check_dimensions(nir, red)?;

    let (rows, cols) = nir.shape();
    let nodata_nir = nir.nodata();
    let nodata_red = red.nodata();
    let grid_n = nir.data();
    let grid_r = red.data();
    let l = params.l_factor;

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let n = grid_n[[row, col]];
                let r = grid_r[[row, col]];

                if is_nodata_f64(n, nodata_nir) || is_nodata_f64(r, nodata_red) {
                    continue;
                }

                let denom = n + r + l;
                if denom.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = ((n - r) / denom) * (1.0 + l);
            }
            row_data
        })
        .collect();

    build_output(nir, rows, cols, data)
}

// ---------------------------------------------------------------------------
// EVI
// ---------------------------------------------------------------------------

/// Parameters for EVI
#[derive(Debug, Clone)]
pub struct EviParams {
    /// Gain factor (default: 2.5)
    pub g: f64,
    /// Aerosol coefficient for red band (default: 6.0)
    pub c1: f64,
    /// Aerosol coefficient for blue band (default: 7.5)
    pub c2: f64,
    /// Canopy background adjustment (default: 1.0)
    pub l: f64,
}

impl Default for EviParams {
    fn default() -> Self {
        Self {
            g: 2.5,
            c1: 6.0,
            c2: 7.5,
            l: 1.0,
        }
    }
}

/// Enhanced Vegetation Index (Huete et al., 2002)
///
/// `EVI = G * (NIR - Red) / (NIR + C1 * Red - C2 * Blue + L)`
///
/// More sensitive than NDVI in high biomass areas and reduces
/// atmospheric and soil noise.
///
/// # Arguments
/// * `nir` - Near-infrared band
/// * `red` - Red band
/// * `blue` - Blue band
/// * `params` - EVI parameters
pub fn evi(
    nir: &Raster<f64>,
    red: &Raster<f64>,
    blue: &Raster<f64>,
    params: EviParams,
) -> Result<Raster<f64>> {
    check_dimensions(nir, red)?;
    check_dimensions(nir, blue)?;

    let (rows, cols) = nir.shape();
    let nodata_nir = nir.nodata();
    let nodata_red = red.nodata();
    let nodata_blue = blue.nodata();
    let grid_n = nir.data();
    let grid_r = red.data();
    let grid_b = blue.data();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let n = grid_n[[row, col]];
                let r = grid_r[[row, col]];
                let b = grid_b[[row, col]];

                if is_nodata_f64(n, nodata_nir)
                    || is_nodata_f64(r, nodata_red)
                    || is_nodata_f64(b, nodata_blue)
                {
                    continue;
                }

                let denom = n + params.c1 * r - params.c2 * b + params.l;
                if denom.abs() < 1e-10 {
                    continue;
                }

                row_data[col] = params.g * (n - r) / denom;
            }
            row_data
        })
        .collect();

    build_output(nir, rows, cols, data)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_nodata_f64(value: f64, nodata: Option<f64>) -> bool {
    if value.is_nan() {
        return true;
    }
    match nodata {
        Some(nd) => (value - nd).abs() < f64::EPSILON,
        None => false,
    }
}

fn check_dimensions(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

fn build_output(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use viridia_core::GeoTransform;

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    fn make_gradient(rows: usize, cols: usize, start: f64, step: f64) -> Raster<f64> {
        let mut r = Raster::new(rows, cols);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        for row in 0..rows {
            for col in 0..cols {
                r.set(row, col, start + (row * cols + col) as f64 * step)
                    .unwrap();
            }
        }
        r
    }

    #[test]
    fn test_normalized_difference_basic() {
        let a = make_band(5, 5, 0.8);
        let b = make_band(5, 5, 0.2);

        let result = normalized_difference(&a, &b).unwrap();
        let val = result.get(2, 2).unwrap();

        // (0.8 - 0.2) / (0.8 + 0.2) = 0.6
        assert!((val - 0.6).abs() < 1e-10, "Expected 0.6, got {}", val);
    }

    #[test]
    fn test_normalized_difference_range() {
        // Result should always be in [-1, 1]
        let a = make_gradient(10, 10, 0.1, 0.01);
        let b = make_gradient(10, 10, 0.5, -0.005);

        let result = normalized_difference(&a, &b).unwrap();

        for row in 0..10 {
            for col in 0..10 {
                let val = result.get(row, col).unwrap();
                if !val.is_nan() {
                    assert!(
                        val >= -1.0 && val <= 1.0,
                        "ND out of range: {} at ({}, {})",
                        val,
                        row,
                        col
                    );
                }
            }
        }
    }

    #[test]
    fn test_normalized_difference_zero_sum() {
        let a = make_band(5, 5, 0.0);
        let b = make_band(5, 5, 0.0);

        let result = normalized_difference(&a, &b).unwrap();
        let val = result.get(2, 2).unwrap();

        assert!(
            val.is_nan(),
            "Zero denominator should produce NaN, got {}",
            val
        );
    }

    #[test]
    fn test_ndvi() {
        let nir = make_band(5, 5, 0.5);
        let red = make_band(5, 5, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        // (0.5 - 0.1) / (0.5 + 0.1) = 0.4/0.6 ≈ 0.6667
        let expected = (0.5 - 0.1) / (0.5 + 0.1);
        assert!(
            (val - expected).abs() < 1e-10,
            "Expected {}, got {}",
            expected,
            val
        );
    }

    #[test]
    fn test_ndvi_water() {
        // Water: Red > NIR, so NDVI goes negative
        let nir = make_band(5, 5, 0.05);
        let red = make_band(5, 5, 0.15);

        let result = ndvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        assert!(val < 0.0, "Water should have negative NDVI, got {}", val);
    }

    #[test]
    fn test_rvi() {
        let nir = make_band(5, 5, 0.6);
        let red = make_band(5, 5, 0.2);

        let result = rvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        // 0.6 / 0.2 = 3.0
        assert!((val - 3.0).abs() < 1e-10, "Expected 3.0, got {}", val);
    }

    #[test]
    fn test_rvi_zero_red() {
        let nir = make_band(5, 5, 0.5);
        let red = make_band(5, 5, 0.0);

        let result = rvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        assert!(val.is_nan(), "Zero red band should produce NaN, got {}", val);
    }

    #[test]
    fn test_savi() {
        let nir = make_band(5, 5, 0.5);
        let red = make_band(5, 5, 0.1);

        let result = savi(&nir, &red, SaviParams::default()).unwrap();
        let val = result.get(2, 2).unwrap();

        // ((0.5 - 0.1) / (0.5 + 0.1 + 0.5)) * 1.5 = (0.4 / 1.1) * 1.5 ≈ 0.5455
        let expected = ((0.5 - 0.1) / (0.5 + 0.1 + 0.5)) * 1.5;
        assert!(
            (val - expected).abs() < 1e-10,
            "Expected {}, got {}",
            expected,
            val
        );
    }

    #[test]
    fn test_evi() {
        let nir = make_band(5, 5, 0.5);
        let red = make_band(5, 5, 0.1);
        let blue = make_band(5, 5, 0.05);

        let result = evi(&nir, &red, &blue, EviParams::default()).unwrap();
        let val = result.get(2, 2).unwrap();

        let params = EviParams::default();
        let expected =
            params.g * (0.5 - 0.1) / (0.5 + params.c1 * 0.1 - params.c2 * 0.05 + params.l);
        assert!(
            (val - expected).abs() < 1e-10,
            "Expected {}, got {}",
            expected,
            val
        );
    }

    #[test]
    fn test_nodata_handling() {
        let mut nir = make_band(5, 5, 0.5);
        nir.set_nodata(Some(-9999.0));
        nir.set(2, 2, -9999.0).unwrap();

        let red = make_band(5, 5, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        let val = result.get(2, 2).unwrap();

        assert!(val.is_nan(), "Nodata pixel should be NaN, got {}", val);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = make_band(5, 5, 1.0);
        let b = make_band(5, 10, 1.0);

        let result = normalized_difference(&a, &b);
        assert!(result.is_err(), "Should fail on dimension mismatch");
    }

    #[test]
    fn test_compute_from_stack() {
        let mut stack = AlignedStack::new(5, 5);
        stack.insert(BandId::B08, make_band(5, 5, 0.5)).unwrap();
        stack.insert(BandId::B04, make_band(5, 5, 0.1)).unwrap();

        let from_stack = VegetationIndex::NDVI.compute(&stack).unwrap();
        let direct = ndvi(&make_band(5, 5, 0.5), &make_band(5, 5, 0.1)).unwrap();

        assert_eq!(
            from_stack.get(2, 2).unwrap(),
            direct.get(2, 2).unwrap(),
            "Stack dispatch must match the direct call"
        );
    }

    #[test]
    fn test_compute_missing_band() {
        let mut stack = AlignedStack::new(5, 5);
        stack.insert(BandId::B08, make_band(5, 5, 0.5)).unwrap();

        let result = VegetationIndex::NDVI.compute(&stack);
        assert!(result.is_err(), "Missing red band should fail");
    }

    #[test]
    fn test_evi_requires_blue() {
        let mut stack = AlignedStack::new(5, 5);
        stack.insert(BandId::B08, make_band(5, 5, 0.5)).unwrap();
        stack.insert(BandId::B04, make_band(5, 5, 0.1)).unwrap();

        let result = VegetationIndex::EVI.compute(&stack);
        assert!(result.is_err(), "EVI without a blue band should fail");
    }

    #[test]
    fn test_index_name_roundtrip() {
        for index in VegetationIndex::ALL {
            let parsed: VegetationIndex = index.as_str().parse().unwrap();
            assert_eq!(parsed, index, "Name {} should parse back", index);
        }

        assert!("NDVI".parse::<VegetationIndex>().is_ok());
        assert!("tcari".parse::<VegetationIndex>().is_err());
    }
}
