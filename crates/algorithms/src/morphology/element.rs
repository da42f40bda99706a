//! Structuring element definitions for morphological operations
//!
//! A structuring element defines the neighborhood shape used in
//! erosion, dilation, and derived transforms.

use viridia_core::{Error, Result};

/// Shape of a structuring element for binary morphology
#[derive(Debug, Clone, PartialEq)]
pub enum StructuringElement {
    /// Square element of given half-width (side = 2*half_width + 1)
    Square(usize),
    /// Rectangular element of explicit size, anchored at (rows/2, cols/2).
    /// Permits even sizes such as the 2x2 gap-filling element.
    Rect(usize, usize),
    /// User-provided boolean footprint (rectangular, anchored at center)
    Custom(Vec<Vec<bool>>),
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Square(1)
    }
}

impl StructuringElement {
    /// Validate the structuring element, returning an error for invalid configurations
    pub fn validate(&self) -> Result<()> {
        match self {
            StructuringElement::Square(half_width) => {
                if *half_width == 0 {
                    return Err(Error::InvalidParameter {
                        name: "half_width",
                        value: "0".to_string(),
                        reason: "structuring element half-width must be at least 1".to_string(),
                    });
                }
                Ok(())
            }
            StructuringElement::Rect(rows, cols) => {
                if *rows == 0 || *cols == 0 {
                    return Err(Error::InvalidParameter {
                        name: "rect",
                        value: format!("{}x{}", rows, cols),
                        reason: "rectangular element sides must be at least 1".to_string(),
                    });
                }
                Ok(())
            }
            StructuringElement::Custom(footprint) => {
                if footprint.is_empty() || footprint[0].is_empty() {
                    return Err(Error::InvalidParameter {
                        name: "footprint",
                        value: "empty".to_string(),
                        reason: "custom footprint must not be empty".to_string(),
                    });
                }
                let width = footprint[0].len();
                for row in footprint {
                    if row.len() != width {
                        return Err(Error::InvalidParameter {
                            name: "footprint",
                            value: format!("row length {}", row.len()),
                            reason: format!("custom footprint must be rectangular (expected {})", width),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Compute (dr, dc) offsets relative to the anchor for all active cells.
    ///
    /// Odd-sized elements anchor at their true center; even-sized elements
    /// anchor at (rows/2, cols/2). Closing and opening are unaffected by
    /// the anchor choice since dilation and erosion shift in opposite
    /// directions.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        match self {
            StructuringElement::Square(half_width) => {
                let hw = *half_width as isize;
                let mut offsets = Vec::with_capacity((2 * half_width + 1).pow(2));
                for dr in -hw..=hw {
                    for dc in -hw..=hw {
                        offsets.push((dr, dc));
                    }
                }
                offsets
            }
            StructuringElement::Rect(rows, cols) => {
                let anchor_r = (*rows / 2) as isize;
                let anchor_c = (*cols / 2) as isize;
                let mut offsets = Vec::with_capacity(rows * cols);
                for r in 0..*rows as isize {
                    for c in 0..*cols as isize {
                        offsets.push((r - anchor_r, c - anchor_c));
                    }
                }
                offsets
            }
            StructuringElement::Custom(footprint) => {
                let anchor_r = (footprint.len() / 2) as isize;
                let anchor_c = (footprint[0].len() / 2) as isize;
                let mut offsets = Vec::new();
                for (r, row) in footprint.iter().enumerate() {
                    for (c, &active) in row.iter().enumerate() {
                        if active {
                            offsets.push((r as isize - anchor_r, c as isize - anchor_c));
                        }
                    }
                }
                offsets
            }
        }
    }
}
