//! Sentinel-2 scene classification codes and maskable class groups

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Per-pixel class of the L2A scene classification (SCL) band.
///
/// Codes follow the Sen2Cor classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneClass {
    NoData,
    SaturatedDefective,
    DarkArea,
    CloudShadow,
    Vegetation,
    NotVegetated,
    Water,
    Unclassified,
    CloudMediumProbability,
    CloudHighProbability,
    ThinCirrus,
    Snow,
}

impl SceneClass {
    /// All scene classes, in code order
    pub const ALL: [SceneClass; 12] = [
        SceneClass::NoData,
        SceneClass::SaturatedDefective,
        SceneClass::DarkArea,
        SceneClass::CloudShadow,
        SceneClass::Vegetation,
        SceneClass::NotVegetated,
        SceneClass::Water,
        SceneClass::Unclassified,
        SceneClass::CloudMediumProbability,
        SceneClass::CloudHighProbability,
        SceneClass::ThinCirrus,
        SceneClass::Snow,
    ];

    /// Raster code of this class
    pub fn code(self) -> u16 {
        match self {
            SceneClass::NoData => 0,
            SceneClass::SaturatedDefective => 1,
            SceneClass::DarkArea => 2,
            SceneClass::CloudShadow => 3,
            SceneClass::Vegetation => 4,
            SceneClass::NotVegetated => 5,
            SceneClass::Water => 6,
            SceneClass::Unclassified => 7,
            SceneClass::CloudMediumProbability => 8,
            SceneClass::CloudHighProbability => 9,
            SceneClass::ThinCirrus => 10,
            SceneClass::Snow => 11,
        }
    }

    /// Decode a raster code, if it names a known class
    pub fn from_code(code: u16) -> Option<SceneClass> {
        SceneClass::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SceneClass::NoData => "no-data",
            SceneClass::SaturatedDefective => "saturated-defective",
            SceneClass::DarkArea => "dark-area",
            SceneClass::CloudShadow => "cloud-shadow",
            SceneClass::Vegetation => "vegetation",
            SceneClass::NotVegetated => "not-vegetated",
            SceneClass::Water => "water",
            SceneClass::Unclassified => "unclassified",
            SceneClass::CloudMediumProbability => "cloud-medium-probability",
            SceneClass::CloudHighProbability => "cloud-high-probability",
            SceneClass::ThinCirrus => "thin-cirrus",
            SceneClass::Snow => "snow",
        }
    }
}

impl fmt::Display for SceneClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Semantic class groups a caller may request from the masker.
///
/// Each group owns a fixed set of scene classification codes. `Cloud`
/// covers every cloud-related class including shadows and cirrus;
/// `Other` collects the residual codes that carry no land-cover meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskClass {
    Cloud,
    Vegetation,
    Water,
    NonVegetation,
    Snow,
    Other,
}

impl MaskClass {
    /// All maskable groups
    pub const ALL: [MaskClass; 6] = [
        MaskClass::Cloud,
        MaskClass::Vegetation,
        MaskClass::Water,
        MaskClass::NonVegetation,
        MaskClass::Snow,
        MaskClass::Other,
    ];

    /// Scene classification codes belonging to this group
    pub fn codes(self) -> &'static [u16] {
        match self {
            MaskClass::Cloud => &[3, 8, 9, 10],
            MaskClass::Vegetation => &[4],
            MaskClass::Water => &[6],
            MaskClass::NonVegetation => &[5],
            MaskClass::Snow => &[11],
            MaskClass::Other => &[0, 1, 2, 7],
        }
    }

    /// Whether a raster code belongs to this group
    pub fn contains(self, code: u16) -> bool {
        self.codes().contains(&code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MaskClass::Cloud => "cloud",
            MaskClass::Vegetation => "vegetation",
            MaskClass::Water => "water",
            MaskClass::NonVegetation => "non-vegetation",
            MaskClass::Snow => "snow",
            MaskClass::Other => "other",
        }
    }
}

impl fmt::Display for MaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MaskClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cloud" => Ok(MaskClass::Cloud),
            "vegetation" => Ok(MaskClass::Vegetation),
            "water" => Ok(MaskClass::Water),
            "non-vegetation" | "non_vegetation" => Ok(MaskClass::NonVegetation),
            "snow" => Ok(MaskClass::Snow),
            "other" => Ok(MaskClass::Other),
            _ => Err(Error::UnknownClass(s.to_string())),
        }
    }
}
