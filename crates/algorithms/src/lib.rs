//! # Viridia Algorithms
//!
//! Raster and vector processing algorithms for Viridia.
//!
//! ## Available Algorithm Categories
//!
//! - **harmonize**: Resolution harmonization onto a common pixel grid
//! - **imagery**: Spectral vegetation indices (NDVI, RVI, SAVI, EVI)
//! - **masking**: Scene classification masks with exclusion buffers
//! - **morphology**: Erosion, dilation, opening, closing
//! - **zones**: Vegetation condition zones from threshold cascades
//! - **contour**: Marching squares outline tracing
//! - **simplify**: Douglas-Peucker outline simplification
//! - **pipeline**: Full tile-to-features processing chain

pub mod harmonize;
pub mod imagery;
pub mod masking;
pub mod morphology;
pub mod zones;
pub mod contour;
pub mod simplify;
pub mod pipeline;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::contour::{
        trace_contours, Contour, ContourTracer, TraceParams, DEFAULT_ISO_LEVEL,
    };
    pub use crate::harmonize::{harmonize, upsample, Harmonize, HarmonizeParams};
    pub use crate::imagery::{
        evi, ndvi, normalized_difference, rvi, savi, VegetationIndex,
    };
    pub use crate::masking::{apply_mask, validity_mask, MaskParams, SceneMask};
    pub use crate::morphology::{
        closing, dilate, erode, opening, StructuringElement,
    };
    pub use crate::pipeline::{zone_features, zone_features_batch, PipelineParams, TileBands};
    pub use crate::simplify::{simplify_contours, Simplify, SimplifyParams};
    pub use crate::zones::{classify_zones, Zone, ZoneClassifier, ZoneParams, ZoneThreshold};
    pub use viridia_core::prelude::*;
}
