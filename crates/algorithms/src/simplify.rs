//! Contour simplification
//!
//! Douglas-Peucker vertex reduction over traced contours. The chain
//! endpoints always survive, so open contours keep their ends and
//! closed contours keep the repeated start point that marks them as
//! closed.

use viridia_core::{Algorithm, Error, Result};

use crate::contour::Contour;

/// Parameters for simplification
#[derive(Debug, Clone)]
pub struct SimplifyParams {
    /// Maximum allowed deviation from the simplified chain, in pixels
    pub tolerance: f64,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self { tolerance: 1.0 }
    }
}

/// Simplification algorithm
#[derive(Debug, Clone, Default)]
pub struct Simplify;

impl Algorithm for Simplify {
    type Input = Vec<Contour>;
    type Output = Vec<Contour>;
    type Params = SimplifyParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Simplify"
    }

    fn description(&self) -> &'static str {
        "Reduce contour vertex count with Douglas-Peucker"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        simplify_contours(&input, params.tolerance)
    }
}

/// Simplify every contour in a batch with the same tolerance.
pub fn simplify_contours(contours: &[Contour], tolerance: f64) -> Result<Vec<Contour>> {
    contours
        .iter()
        .map(|contour| simplify_contour(contour, tolerance))
        .collect()
}

/// Simplify a single contour.
///
/// A zero tolerance returns the contour unchanged, collinear vertices
/// included. A tolerance that is negative or not a number is a fatal
/// parameter error.
pub fn simplify_contour(contour: &Contour, tolerance: f64) -> Result<Contour> {
    Ok(Contour {
        points: simplify_points(&contour.points, tolerance)?,
    })
}

/// Douglas-Peucker over a raw point chain.
pub fn simplify_points(points: &[(f64, f64)], tolerance: f64) -> Result<Vec<(f64, f64)>> {
    if !(tolerance >= 0.0) {
        return Err(Error::InvalidParameter {
            name: "tolerance",
            value: tolerance.to_string(),
            reason: "tolerance must be a non-negative number".to_string(),
        });
    }

    if tolerance == 0.0 || points.len() <= 2 {
        return Ok(points.to_vec());
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    douglas_peucker(points, 0, points.len() - 1, tolerance, &mut keep);

    Ok(points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect())
}

/// Mark the vertices to keep between `first` and `last`: the farthest
/// vertex survives when it deviates more than the tolerance, and both
/// halves are refined recursively.
fn douglas_peucker(
    points: &[(f64, f64)],
    first: usize,
    last: usize,
    tolerance: f64,
    keep: &mut [bool],
) {
    if last <= first + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut index = first;
    for i in first + 1..last {
        let d = deviation(points[i], points[first], points[last]);
        if d > max_dist {
            max_dist = d;
            index = i;
        }
    }

    if max_dist > tolerance {
        keep[index] = true;
        douglas_peucker(points, first, index, tolerance, keep);
        douglas_peucker(points, index, last, tolerance, keep);
    }
}

/// Perpendicular distance of `p` from the segment `a`-`b`. When the
/// segment is degenerate, as at the base of a closed ring, the plain
/// point distance is used instead.
fn deviation(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let dr = b.0 - a.0;
    let dc = b.1 - a.1;
    let len_sq = dr * dr + dc * dc;

    if len_sq < 1e-24 {
        return ((p.0 - a.0).powi(2) + (p.1 - a.1).powi(2)).sqrt();
    }

    (dr * (p.1 - a.1) - dc * (p.0 - a.0)).abs() / len_sq.sqrt()
}
