//! Contour extraction by marching squares
//!
//! Traces the boundary between set and unset pixels of a binary mask as
//! sub-pixel polylines. Every 2 x 2 window of pixels forms a cell; the
//! crossing point on a cell edge is placed by linear interpolation of
//! the corner values against the iso level. Segments are linked through
//! the identity of the cell edge they end on, so chains never break on
//! floating point noise.

use std::collections::HashMap;

use viridia_core::raster::Raster;
use viridia_core::{Algorithm, Error, Result};

/// Default iso level. Values near 1 hug the set region, values near 0
/// hug the unset one.
pub const DEFAULT_ISO_LEVEL: f64 = 0.8;

/// A traced contour in fractional (row, col) pixel coordinates, where
/// an integer coordinate is a pixel center.
///
/// A closed contour repeats its first point as its last; a contour that
/// runs into the grid border stays open.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Crossing points in traversal order
    pub points: Vec<(f64, f64)>,
}

impl Contour {
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Parameters for contour tracing
#[derive(Debug, Clone)]
pub struct TraceParams {
    /// Iso level, strictly between 0 and 1
    pub level: f64,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            level: DEFAULT_ISO_LEVEL,
        }
    }
}

/// Contour tracing algorithm
#[derive(Debug, Clone, Default)]
pub struct ContourTracer;

impl Algorithm for ContourTracer {
    type Input = Raster<u8>;
    type Output = Vec<Contour>;
    type Params = TraceParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ContourTracer"
    }

    fn description(&self) -> &'static str {
        "Trace mask boundaries as sub-pixel contour polylines"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        trace_contours(&input, &params)
    }
}

/// Identity of a cell edge in the pixel grid.
///
/// `H(r, c)` runs between pixels (r, c) and (r, c + 1); `V(r, c)` runs
/// between (r, c) and (r + 1, c). Two cells sharing an edge agree on
/// its key, which is what links their segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    H(usize, usize),
    V(usize, usize),
}

/// Trace all contours of a binary mask at the given iso level.
///
/// A mask without any 0/1 transition, a fully set or fully unset mask
/// included, yields an empty list rather than an error. Grids smaller
/// than 2 x 2 have no cells and also yield an empty list.
pub fn trace_contours(mask: &Raster<u8>, params: &TraceParams) -> Result<Vec<Contour>> {
    if !(params.level > 0.0 && params.level < 1.0) {
        return Err(Error::InvalidParameter {
            name: "level",
            value: params.level.to_string(),
            reason: "iso level must lie strictly between 0 and 1".to_string(),
        });
    }

    let (rows, cols) = mask.shape();
    if rows < 2 || cols < 2 {
        return Ok(Vec::new());
    }

    let mut segments: Vec<(EdgeKey, EdgeKey)> = Vec::new();
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let tl = corner(mask, r, c);
            let tr = corner(mask, r, c + 1);
            let bl = corner(mask, r + 1, c);
            let br = corner(mask, r + 1, c + 1);

            let mut case = 0u8;
            if tl >= params.level {
                case |= 1;
            }
            if tr >= params.level {
                case |= 2;
            }
            if br >= params.level {
                case |= 4;
            }
            if bl >= params.level {
                case |= 8;
            }

            for pair in cell_edges(case, r, c).into_iter().flatten() {
                segments.push(pair);
            }
        }
    }

    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let mut incident: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (i, (a, b)) in segments.iter().enumerate() {
        incident.entry(*a).or_default().push(i);
        incident.entry(*b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    // Open chains start at an edge only one segment touches
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        let (a, b) = segments[i];
        let start = if incident[&a].len() == 1 {
            a
        } else if incident[&b].len() == 1 {
            b
        } else {
            continue;
        };
        contours.push(walk(start, &segments, &incident, &mut used, mask, params.level));
    }

    // Whatever remains belongs to closed loops
    for i in 0..segments.len() {
        if !used[i] {
            contours.push(walk(
                segments[i].0,
                &segments,
                &incident,
                &mut used,
                mask,
                params.level,
            ));
        }
    }

    Ok(contours)
}

/// Follow linked segments from `start` until the chain ends or returns
/// to its starting edge, collecting crossing points along the way.
fn walk(
    start: EdgeKey,
    segments: &[(EdgeKey, EdgeKey)],
    incident: &HashMap<EdgeKey, Vec<usize>>,
    used: &mut [bool],
    mask: &Raster<u8>,
    level: f64,
) -> Contour {
    let mut points = vec![edge_point(mask, level, start)];
    let mut current = start;

    loop {
        let Some(&i) = incident[&current].iter().find(|&&i| !used[i]) else {
            break;
        };
        used[i] = true;

        let (a, b) = segments[i];
        current = if a == current { b } else { a };
        points.push(edge_point(mask, level, current));

        if current == start {
            break;
        }
    }

    Contour { points }
}

/// Marching squares lookup: which edge pairs the contour connects for a
/// given corner configuration. Cases 5 and 10 are saddles and emit two
/// separate segments.
fn cell_edges(case: u8, r: usize, c: usize) -> [Option<(EdgeKey, EdgeKey)>; 2] {
    let top = EdgeKey::H(r, c);
    let bottom = EdgeKey::H(r + 1, c);
    let left = EdgeKey::V(r, c);
    let right = EdgeKey::V(r, c + 1);

    match case {
        0 | 15 => [None, None],
        1 | 14 => [Some((left, top)), None],
        2 | 13 => [Some((top, right)), None],
        3 | 12 => [Some((left, right)), None],
        4 | 11 => [Some((right, bottom)), None],
        5 => [Some((left, top)), Some((right, bottom))],
        6 | 9 => [Some((top, bottom)), None],
        7 | 8 => [Some((left, bottom)), None],
        10 => [Some((top, right)), Some((left, bottom))],
        _ => [None, None],
    }
}

/// Sub-pixel crossing point on a cell edge
fn edge_point(mask: &Raster<u8>, level: f64, edge: EdgeKey) -> (f64, f64) {
    match edge {
        EdgeKey::H(r, c) => {
            let t = crossing(corner(mask, r, c), corner(mask, r, c + 1), level);
            (r as f64, c as f64 + t)
        }
        EdgeKey::V(r, c) => {
            let t = crossing(corner(mask, r, c), corner(mask, r + 1, c), level);
            (r as f64 + t, c as f64)
        }
    }
}

/// Linear interpolation of the level between two corner values
fn crossing(v1: f64, v2: f64, level: f64) -> f64 {
    if (v2 - v1).abs() < 1e-12 {
        return 0.5;
    }
    ((level - v1) / (v2 - v1)).clamp(0.0, 1.0)
}

fn corner(mask: &Raster<u8>, r: usize, c: usize) -> f64 {
    if mask.data()[[r, c]] != 0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_point(contour: &Contour, expected: (f64, f64)) -> bool {
        contour
            .points
            .iter()
            .any(|p| (p.0 - expected.0).abs() < 1e-9 && (p.1 - expected.1).abs() < 1e-9)
    }

    #[test]
    fn test_empty_mask_yields_no_contours() {
        let mask: Raster<u8> = Raster::new(5, 5);
        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert!(contours.is_empty());
    }

    #[test]
    fn test_full_mask_yields_no_contours() {
        let mask: Raster<u8> = Raster::filled(5, 5, 1);
        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert!(contours.is_empty(), "no transition means no contour");
    }

    #[test]
    fn test_degenerate_grid() {
        let mut mask: Raster<u8> = Raster::new(1, 5);
        mask.set(0, 2, 1).unwrap();
        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert!(contours.is_empty());
    }

    #[test]
    fn test_level_must_be_within_unit_interval() {
        let mask: Raster<u8> = Raster::new(4, 4);
        for level in [0.0, 1.0, -0.3, 1.5, f64::NAN] {
            assert!(
                trace_contours(&mask, &TraceParams { level }).is_err(),
                "level {} should be rejected",
                level
            );
        }
    }

    #[test]
    fn test_single_pixel_diamond() {
        let mut mask: Raster<u8> = Raster::new(5, 5);
        mask.set(2, 2, 1).unwrap();

        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert_eq!(contours.len(), 1);

        let contour = &contours[0];
        assert!(contour.is_closed(), "interior blob must close");
        assert_eq!(contour.points.len(), 5, "diamond plus repeated start");

        // At level 0.8 the crossings sit 0.2 pixels outside the center
        for vertex in [(1.8, 2.0), (2.0, 1.8), (2.2, 2.0), (2.0, 2.2)] {
            assert!(
                has_point(contour, vertex),
                "vertex {:?} missing from {:?}",
                vertex,
                contour.points
            );
        }
    }

    #[test]
    fn test_level_shifts_crossing() {
        let mut mask: Raster<u8> = Raster::new(5, 5);
        mask.set(2, 2, 1).unwrap();

        let contours = trace_contours(&mask, &TraceParams { level: 0.5 }).unwrap();
        assert_eq!(contours.len(), 1);
        assert!(
            has_point(&contours[0], (1.5, 2.0)),
            "midway level places the crossing halfway between pixels"
        );
    }

    #[test]
    fn test_block_contour() {
        let mut mask: Raster<u8> = Raster::new(6, 6);
        for r in 2..4 {
            for c in 2..4 {
                mask.set(r, c, 1).unwrap();
            }
        }

        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert_eq!(contours.len(), 1);
        assert!(contours[0].is_closed());
        assert_eq!(
            contours[0].points.len(),
            9,
            "octagon around a 2 x 2 block plus repeated start"
        );
    }

    #[test]
    fn test_two_blobs_trace_separately() {
        let mut mask: Raster<u8> = Raster::new(7, 7);
        mask.set(1, 1, 1).unwrap();
        mask.set(4, 4, 1).unwrap();

        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert_eq!(contours.len(), 2);
        for contour in &contours {
            assert!(contour.is_closed());
            assert_eq!(contour.points.len(), 5);
        }
    }

    #[test]
    fn test_border_blob_stays_open() {
        let mut mask: Raster<u8> = Raster::new(4, 4);
        mask.set(0, 0, 1).unwrap();

        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert_eq!(contours.len(), 1);
        assert!(!contours[0].is_closed());
        assert_eq!(contours[0].points.len(), 2);
    }

    #[test]
    fn test_saddle_cell_emits_two_chains() {
        let mut mask: Raster<u8> = Raster::new(2, 2);
        mask.set(0, 0, 1).unwrap();
        mask.set(1, 1, 1).unwrap();

        let contours = trace_contours(&mask, &TraceParams::default()).unwrap();
        assert_eq!(contours.len(), 2, "a saddle keeps opposite corners apart");
        for contour in &contours {
            assert_eq!(contour.points.len(), 2);
            assert!(!contour.is_closed());
        }
    }
}
