//! Sentinel-2 band identities, native resolutions, and the aligned stack

use crate::error::{Error, Result};
use crate::raster::Raster;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Native sampling scale of a band relative to the 10 m reference grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionClass {
    /// 10 m ground sample distance (the reference grid)
    Fine,
    /// 20 m ground sample distance
    Medium,
    /// 60 m ground sample distance
    Coarse,
}

impl ResolutionClass {
    /// Integer pixel-replication factor needed to reach the reference grid
    pub fn factor(self) -> usize {
        match self {
            ResolutionClass::Fine => 1,
            ResolutionClass::Medium => 2,
            ResolutionClass::Coarse => 6,
        }
    }

    /// Ground sample distance in meters
    pub fn ground_sample_distance(self) -> f64 {
        match self {
            ResolutionClass::Fine => 10.0,
            ResolutionClass::Medium => 20.0,
            ResolutionClass::Coarse => 60.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionClass::Fine => "fine",
            ResolutionClass::Medium => "medium",
            ResolutionClass::Coarse => "coarse",
        }
    }
}

impl fmt::Display for ResolutionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Band identifiers of a Sentinel-2 L2A surface reflectance product.
///
/// Covers the twelve spectral bands shipped at L2A (B10 is consumed by the
/// atmospheric correction and never delivered) plus the auxiliary layers:
/// aerosol optical thickness, scene classification, true-color image, and
/// water vapor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BandId {
    B01,
    B02,
    B03,
    B04,
    B05,
    B06,
    B07,
    B08,
    B8a,
    B09,
    B11,
    B12,
    Aot,
    Scl,
    Tci,
    Wvp,
}

impl BandId {
    /// All band identifiers, in product order
    pub const ALL: [BandId; 16] = [
        BandId::B01,
        BandId::B02,
        BandId::B03,
        BandId::B04,
        BandId::B05,
        BandId::B06,
        BandId::B07,
        BandId::B08,
        BandId::B8a,
        BandId::B09,
        BandId::B11,
        BandId::B12,
        BandId::Aot,
        BandId::Scl,
        BandId::Tci,
        BandId::Wvp,
    ];

    /// Native resolution class of this band in an L2A product
    pub fn resolution(self) -> ResolutionClass {
        match self {
            BandId::B02
            | BandId::B03
            | BandId::B04
            | BandId::B08
            | BandId::Aot
            | BandId::Tci
            | BandId::Wvp => ResolutionClass::Fine,
            BandId::B05
            | BandId::B06
            | BandId::B07
            | BandId::B8a
            | BandId::B11
            | BandId::B12
            | BandId::Scl => ResolutionClass::Medium,
            BandId::B01 | BandId::B09 => ResolutionClass::Coarse,
        }
    }

    /// Product token for this band (as it appears in granule file names)
    pub fn as_str(self) -> &'static str {
        match self {
            BandId::B01 => "B01",
            BandId::B02 => "B02",
            BandId::B03 => "B03",
            BandId::B04 => "B04",
            BandId::B05 => "B05",
            BandId::B06 => "B06",
            BandId::B07 => "B07",
            BandId::B08 => "B08",
            BandId::B8a => "B8A",
            BandId::B09 => "B09",
            BandId::B11 => "B11",
            BandId::B12 => "B12",
            BandId::Aot => "AOT",
            BandId::Scl => "SCL",
            BandId::Tci => "TCI",
            BandId::Wvp => "WVP",
        }
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BandId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "B01" => Ok(BandId::B01),
            "B02" => Ok(BandId::B02),
            "B03" => Ok(BandId::B03),
            "B04" => Ok(BandId::B04),
            "B05" => Ok(BandId::B05),
            "B06" => Ok(BandId::B06),
            "B07" => Ok(BandId::B07),
            "B08" => Ok(BandId::B08),
            "B8A" => Ok(BandId::B8a),
            "B09" => Ok(BandId::B09),
            "B11" => Ok(BandId::B11),
            "B12" => Ok(BandId::B12),
            "AOT" => Ok(BandId::Aot),
            "SCL" => Ok(BandId::Scl),
            "TCI" => Ok(BandId::Tci),
            "WVP" => Ok(BandId::Wvp),
            _ => Err(Error::UnknownBand(s.to_string())),
        }
    }
}

/// Reflectance bands upsampled to the reference grid, keyed by band id.
///
/// Produced once per tile by the harmonizer; all members share the
/// reference shape. Inserting a band with a different shape is rejected,
/// so every consumer may assume aligned dimensions.
#[derive(Debug, Clone)]
pub struct AlignedStack {
    bands: BTreeMap<BandId, Raster<f64>>,
    shape: (usize, usize),
}

impl AlignedStack {
    /// Create an empty stack for a reference grid of the given shape
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            bands: BTreeMap::new(),
            shape: (rows, cols),
        }
    }

    /// Reference grid shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Insert a band, rejecting any shape that differs from the reference
    pub fn insert(&mut self, id: BandId, band: Raster<f64>) -> Result<()> {
        if band.shape() != self.shape {
            let (ar, ac) = band.shape();
            return Err(Error::SizeMismatch {
                er: self.shape.0,
                ec: self.shape.1,
                ar,
                ac,
            });
        }
        self.bands.insert(id, band);
        Ok(())
    }

    /// Get a band if present
    pub fn get(&self, id: BandId) -> Option<&Raster<f64>> {
        self.bands.get(&id)
    }

    /// Get a band, failing if it was never loaded
    pub fn band(&self, id: BandId) -> Result<&Raster<f64>> {
        self.bands
            .get(&id)
            .ok_or_else(|| Error::MissingBand(id.to_string()))
    }

    /// Whether a band is present
    pub fn contains(&self, id: BandId) -> bool {
        self.bands.contains_key(&id)
    }

    /// Number of bands in the stack
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether the stack holds no bands
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Iterate over (band id, raster) pairs in band order
    pub fn iter(&self) -> impl Iterator<Item = (&BandId, &Raster<f64>)> {
        self.bands.iter()
    }
}
