//! Binary morphology for raster masks
//!
//! Classical morphological operations over 0/1 masks:
//! - **Erosion**: a pixel survives only if the element fits in the set region
//! - **Dilation**: every set pixel stamps the element onto the output
//! - **Opening**: erosion then dilation (removes small set features)
//! - **Closing**: dilation then erosion (fills small gaps)
//!
//! Dilation treats out-of-bounds reads as unset and erosion treats them
//! as set, so masks never grow or shrink from beyond the raster edge.

mod closing;
mod dilate;
mod element;
mod erode;
mod opening;

pub use closing::{closing, Closing, ClosingParams};
pub use dilate::{dilate, Dilate, DilateParams};
pub use element::StructuringElement;
pub use erode::{erode, Erode, ErodeParams};
pub use opening::{opening, Opening, OpeningParams};
