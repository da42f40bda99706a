//! Tile processing pipeline
//!
//! Drives a full tile from raw bands to vegetation condition features:
//! harmonize the bands onto the reference grid, build the validity mask
//! from the scene classification, compute the index, split it into
//! zones, and trace every zone into simplified geo-referenced features.

use std::collections::BTreeMap;

use geo_types::{Coord, Geometry, LineString, Polygon};
use rayon::prelude::*;
use tracing::{debug, info};

use viridia_core::band::{AlignedStack, BandId};
use viridia_core::raster::{GeoTransform, Raster};
use viridia_core::vector::{AttributeValue, Feature, FeatureCollection};
use viridia_core::{Error, Result};

use crate::contour::{trace_contours, Contour, TraceParams};
use crate::harmonize::harmonize;
use crate::imagery::VegetationIndex;
use crate::masking::{apply_mask, validity_mask, MaskParams};
use crate::simplify::simplify_contours;
use crate::zones::{classify_zones, Zone, ZoneParams};

/// Raw bands of one tile at their native resolutions
#[derive(Debug, Clone, Default)]
pub struct TileBands {
    /// Reflectance bands keyed by band id
    pub bands: BTreeMap<BandId, Raster<f64>>,
    /// Scene classification at its native resolution, when available
    pub scl: Option<Raster<u16>>,
}

impl TileBands {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Parameters for the whole pipeline
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Index driving the zone classification
    pub index: VegetationIndex,
    /// Validity mask construction
    pub mask: MaskParams,
    /// Threshold cascade
    pub zones: ZoneParams,
    /// Contour tracing
    pub trace: TraceParams,
    /// Douglas-Peucker tolerance in pixels
    pub simplify_tolerance: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            index: VegetationIndex::NDVI,
            mask: MaskParams::default(),
            zones: ZoneParams::default(),
            trace: TraceParams::default(),
            simplify_tolerance: 1.0,
        }
    }
}

/// Reference grid shape for a tile.
///
/// Every supported index needs the fine NIR band, so its shape defines
/// the grid all other bands are harmonized to.
pub fn reference_shape(tile: &TileBands) -> Result<(usize, usize)> {
    let nir = tile
        .bands
        .get(&BandId::B08)
        .ok_or_else(|| Error::MissingBand(BandId::B08.to_string()))?;
    Ok(nir.shape())
}

/// Harmonize raw bands onto the reference grid and collect them into
/// an aligned stack.
pub fn harmonized_stack(
    bands: &BTreeMap<BandId, Raster<f64>>,
    reference: (usize, usize),
) -> Result<AlignedStack> {
    let mut stack = AlignedStack::new(reference.0, reference.1);
    for (id, band) in bands {
        let band = harmonize(band, id.resolution(), reference)?;
        stack.insert(*id, band)?;
    }
    Ok(stack)
}

/// Process one tile into vegetation condition features.
///
/// Without a scene classification the index goes unmasked into the
/// cascade. A tile whose zones are all empty produces an empty
/// collection, which is an ordinary result.
pub fn zone_features(tile: &TileBands, params: &PipelineParams) -> Result<FeatureCollection> {
    let reference = reference_shape(tile)?;
    let stack = harmonized_stack(&tile.bands, reference)?;
    debug!(
        "harmonized {} bands onto {} x {} grid",
        stack.len(),
        reference.0,
        reference.1
    );

    let mut index = params.index.compute(&stack)?;

    if let Some(scl) = &tile.scl {
        let scl = harmonize(scl, BandId::Scl.resolution(), reference)?;
        let mask = validity_mask(&scl, &params.mask)?;
        index = apply_mask(&index, &mask)?;
        debug!("applied scene classification mask");
    }

    let zones = classify_zones(&index, &params.zones)?;

    let mut collection = FeatureCollection::new();
    for zone in &zones {
        let contours = trace_contours(&zone.mask, &params.trace)?;
        let simplified = simplify_contours(&contours, params.simplify_tolerance)?;

        let mut kept = 0;
        for contour in &simplified {
            if let Some(feature) = zone_feature(zone, contour, params.index, zone.mask.transform())
            {
                collection.push(feature);
                kept += 1;
            }
        }
        info!("zone {}: {} outlines", zone.label, kept);
    }

    Ok(collection)
}

/// Process a batch of tiles in parallel.
///
/// Collections come back in input order; the first failing tile fails
/// the batch.
pub fn zone_features_batch(
    tiles: &[TileBands],
    params: &PipelineParams,
) -> Result<Vec<FeatureCollection>> {
    tiles
        .par_iter()
        .map(|tile| zone_features(tile, params))
        .collect()
}

/// Turn one traced contour into a feature carrying the zone
/// attributes. A contour too degenerate for any geometry, such as a
/// ring collapsed by simplification, yields nothing.
fn zone_feature(
    zone: &Zone,
    contour: &Contour,
    index: VegetationIndex,
    transform: &GeoTransform,
) -> Option<Feature> {
    let geometry = contour_geometry(contour, transform)?;

    let mut feature = Feature::new(geometry);
    feature.set_property("zone", AttributeValue::String(zone.label.clone()));
    feature.set_property("threshold", AttributeValue::Float(zone.threshold));
    feature.set_property("index", AttributeValue::String(index.to_string()));
    Some(feature)
}

/// Map a traced contour from pixel space into the raster's coordinate
/// system.
///
/// Closed contours with enough vertices become polygons, open chains
/// become linestrings, anything shorter yields nothing.
pub fn contour_geometry(contour: &Contour, transform: &GeoTransform) -> Option<Geometry<f64>> {
    let coords: Vec<Coord<f64>> = contour
        .points
        .iter()
        .map(|&(row, col)| {
            let (x, y) = transform.pixel_to_geo_fract(col, row);
            Coord { x, y }
        })
        .collect();

    if contour.is_closed() && coords.len() >= 4 {
        Some(Geometry::Polygon(Polygon::new(
            LineString::from(coords),
            vec![],
        )))
    } else if coords.len() >= 2 {
        Some(Geometry::LineString(LineString::from(coords)))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viridia_core::SceneClass;

    /// 8 x 8 tile with a 4 x 4 healthy block in the middle and bare
    /// soil around it
    fn block_tile() -> TileBands {
        let mut nir = Raster::filled(8, 8, 0.12);
        nir.set_transform(GeoTransform::new(500_000.0, 4_600_000.0, 10.0, -10.0));
        for r in 2..6 {
            for c in 2..6 {
                nir.set(r, c, 0.5).unwrap();
            }
        }

        let mut red = Raster::filled(8, 8, 0.1);
        red.set_transform(GeoTransform::new(500_000.0, 4_600_000.0, 10.0, -10.0));

        let mut tile = TileBands::new();
        tile.bands.insert(BandId::B08, nir);
        tile.bands.insert(BandId::B04, red);
        tile
    }

    fn unmasked_params() -> PipelineParams {
        PipelineParams {
            mask: MaskParams {
                classes: vec![viridia_core::MaskClass::Cloud],
                buffer: None,
            },
            simplify_tolerance: 0.0,
            ..PipelineParams::default()
        }
    }

    #[test]
    fn test_missing_nir_band_fails() {
        let tile = TileBands::new();
        assert!(zone_features(&tile, &PipelineParams::default()).is_err());
    }

    #[test]
    fn test_block_tile_produces_one_polygon() {
        let collection = zone_features(&block_tile(), &unmasked_params()).unwrap();

        assert_eq!(collection.len(), 1, "one healthy outline expected");
        let feature = collection.iter().next().unwrap();
        assert_eq!(
            feature.get_property("zone"),
            Some(&AttributeValue::String("healthy".to_string()))
        );
        assert_eq!(
            feature.get_property("index"),
            Some(&AttributeValue::String("ndvi".to_string()))
        );
        assert!(matches!(feature.geometry, Some(Geometry::Polygon(_))));
    }

    #[test]
    fn test_cloudy_block_disappears() {
        let mut tile = block_tile();

        // Scene classification at 20 m: vegetation everywhere except
        // clouds over the whole block
        let mut scl = Raster::filled(4, 4, SceneClass::Vegetation.code());
        for r in 1..3 {
            for c in 1..3 {
                scl.set(r, c, SceneClass::CloudHighProbability.code()).unwrap();
            }
        }
        tile.scl = Some(scl);

        let collection = zone_features(&tile, &unmasked_params()).unwrap();
        assert!(
            collection.is_empty(),
            "masked-out block must yield no outlines"
        );
    }

    #[test]
    fn test_geo_coordinates_stay_within_tile_bounds() {
        let collection = zone_features(&block_tile(), &unmasked_params()).unwrap();
        let feature = collection.iter().next().unwrap();

        let Some(Geometry::Polygon(polygon)) = &feature.geometry else {
            panic!("expected polygon");
        };
        for coord in polygon.exterior().coords() {
            assert!(
                (500_000.0..=500_080.0).contains(&coord.x),
                "x {} outside tile",
                coord.x
            );
            assert!(
                (4_599_920.0..=4_600_000.0).contains(&coord.y),
                "y {} outside tile",
                coord.y
            );
        }
    }

    #[test]
    fn test_batch_preserves_order() {
        let empty_tile = {
            let mut tile = block_tile();
            let nir = Raster::filled(8, 8, 0.1);
            tile.bands.insert(BandId::B08, nir);
            tile
        };

        let results =
            zone_features_batch(&[block_tile(), empty_tile], &unmasked_params()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), 1);
        assert!(results[1].is_empty());
    }
}
