//! Imagery analysis algorithms
//!
//! Algorithms for remote sensing and spectral analysis:
//! - Vegetation indices: NDVI, RVI, SAVI, EVI
//! - Normalized difference: generic two-band index

mod indices;

pub use indices::{
    evi, ndvi, normalized_difference, rvi, savi, EviParams, SaviParams, VegetationIndex,
};
