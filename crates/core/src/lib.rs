//! # Viridia Core
//!
//! Core types, traits and I/O for the Viridia vegetation-mapping library.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `BandId` / `ResolutionClass`: Sentinel-2 band identities and scales
//! - `SceneClass` / `MaskClass`: scene classification code tables
//! - Algorithm traits for consistent API
//! - Native GeoTIFF I/O

pub mod band;
pub mod error;
pub mod io;
pub mod raster;
pub mod scene;
pub mod vector;

pub use band::{AlignedStack, BandId, ResolutionClass};
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use scene::{MaskClass, SceneClass};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::band::{AlignedStack, BandId, ResolutionClass};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::scene::{MaskClass, SceneClass};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in Viridia.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
