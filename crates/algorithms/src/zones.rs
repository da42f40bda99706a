//! Condition zone classification
//!
//! Splits an index grid into labelled zones with a descending threshold
//! cascade. Each category keeps the pixels strictly above its threshold,
//! speckle is removed by a closing/opening pair, and overlap between
//! categories is resolved toward the strictest one, so the returned
//! masks are pairwise disjoint.

use viridia_core::raster::Raster;
use viridia_core::{Algorithm, Error, Result};

use crate::morphology::{closing, opening, StructuringElement};

/// One step of the threshold cascade
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneThreshold {
    /// Category label carried into output attributes
    pub label: String,
    /// Lower bound; a pixel joins the category when its index value is
    /// strictly greater
    pub threshold: f64,
}

impl ZoneThreshold {
    pub fn new(label: impl Into<String>, threshold: f64) -> Self {
        Self {
            label: label.into(),
            threshold,
        }
    }
}

/// Parameters for zone classification
#[derive(Debug, Clone)]
pub struct ZoneParams {
    /// Threshold cascade in strictly descending order
    pub thresholds: Vec<ZoneThreshold>,
}

impl Default for ZoneParams {
    fn default() -> Self {
        Self {
            thresholds: vec![
                ZoneThreshold::new("healthy", 0.6),
                ZoneThreshold::new("moderate", 0.4),
                ZoneThreshold::new("weak", 0.25),
            ],
        }
    }
}

/// A classified zone: the category label, its threshold, and the
/// cleaned exclusive mask (1 = pixel belongs to the category)
#[derive(Debug, Clone)]
pub struct Zone {
    pub label: String,
    pub threshold: f64,
    pub mask: Raster<u8>,
}

/// Zone classification algorithm
#[derive(Debug, Clone, Default)]
pub struct ZoneClassifier;

impl Algorithm for ZoneClassifier {
    type Input = Raster<f64>;
    type Output = Vec<Zone>;
    type Params = ZoneParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ZoneClassifier"
    }

    fn description(&self) -> &'static str {
        "Split an index grid into exclusive condition zones by a threshold cascade"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        classify_zones(&input, &params)
    }
}

/// Classify an index grid into exclusive condition zones.
///
/// For each cascade step the raw mask keeps pixels strictly above the
/// step threshold. NaN fails every comparison, so an undefined or
/// masked-out pixel belongs to no category. Raw masks are cleaned with
/// a 2 x 2 closing followed by a 3 x 3 opening; the last category is
/// opened with the 2 x 2 element instead and keeps smaller patches.
/// Wherever cleaned masks overlap, the pixel goes to the strictest
/// category.
///
/// Zones come back in cascade order. A zone whose mask is entirely
/// zero is an ordinary result, not an error.
pub fn classify_zones(index: &Raster<f64>, params: &ZoneParams) -> Result<Vec<Zone>> {
    validate_thresholds(&params.thresholds)?;

    let last = params.thresholds.len().saturating_sub(1);
    let mut zones = Vec::with_capacity(params.thresholds.len());
    let mut claimed: Option<Raster<u8>> = None;

    for (i, step) in params.thresholds.iter().enumerate() {
        let raw = threshold_mask(index, step.threshold);

        let open_element = if i == last {
            StructuringElement::Rect(2, 2)
        } else {
            StructuringElement::Square(1)
        };
        let cleaned = opening(&closing(&raw, &StructuringElement::Rect(2, 2))?, &open_element)?;

        let exclusive = match &claimed {
            Some(stricter) => subtract(&cleaned, stricter),
            None => cleaned.clone(),
        };

        claimed = Some(match claimed {
            Some(stricter) => union(&stricter, &cleaned),
            None => cleaned,
        });

        zones.push(Zone {
            label: step.label.clone(),
            threshold: step.threshold,
            mask: exclusive,
        });
    }

    Ok(zones)
}

fn validate_thresholds(thresholds: &[ZoneThreshold]) -> Result<()> {
    for step in thresholds {
        if !step.threshold.is_finite() {
            return Err(Error::InvalidParameter {
                name: "thresholds",
                value: step.threshold.to_string(),
                reason: "threshold must be finite".to_string(),
            });
        }
    }

    for pair in thresholds.windows(2) {
        if pair[0].threshold <= pair[1].threshold {
            return Err(Error::InvalidParameter {
                name: "thresholds",
                value: format!("{} then {}", pair[0].threshold, pair[1].threshold),
                reason: "cascade must be strictly descending".to_string(),
            });
        }
    }

    Ok(())
}

/// Raw category mask: 1 where the index is strictly above the threshold
fn threshold_mask(index: &Raster<f64>, threshold: f64) -> Raster<u8> {
    let (rows, cols) = index.shape();
    let mut mask = index.with_same_meta::<u8>(rows, cols);
    for ((r, c), &value) in index.data().indexed_iter() {
        if value > threshold {
            mask.data_mut()[[r, c]] = 1;
        }
    }
    mask
}

fn union(a: &Raster<u8>, b: &Raster<u8>) -> Raster<u8> {
    let mut out = a.clone();
    for ((r, c), &v) in b.data().indexed_iter() {
        if v != 0 {
            out.data_mut()[[r, c]] = 1;
        }
    }
    out
}

fn subtract(a: &Raster<u8>, b: &Raster<u8>) -> Raster<u8> {
    let mut out = a.clone();
    for ((r, c), &v) in b.data().indexed_iter() {
        if v != 0 {
            out.data_mut()[[r, c]] = 0;
        }
    }
    out
}
