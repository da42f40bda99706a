//! Viridia CLI - Vegetation condition mapping from satellite imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use viridia_algorithms::contour::{trace_contours, TraceParams};
use viridia_algorithms::imagery::VegetationIndex;
use viridia_algorithms::masking::{validity_mask, MaskParams};
use viridia_algorithms::morphology::StructuringElement;
use viridia_algorithms::pipeline::{
    contour_geometry, harmonized_stack, reference_shape, zone_features, PipelineParams, TileBands,
};
use viridia_algorithms::simplify::simplify_contours;
use viridia_algorithms::zones::{ZoneParams, ZoneThreshold};
use viridia_core::io::{read_geotiff, write_geotiff};
use viridia_core::vector::{AttributeValue, Feature, FeatureCollection};
use viridia_core::{BandId, MaskClass, Raster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "viridia")]
#[command(author, version, about = "Vegetation condition mapping from satellite imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Compute a vegetation index from reflectance bands
    Index {
        /// Output file
        output: PathBuf,
        /// NIR band file (B08, 10 m)
        #[arg(long)]
        nir: PathBuf,
        /// Red band file (B04, 10 m)
        #[arg(long)]
        red: PathBuf,
        /// Blue band file (B02, 10 m), needed for EVI
        #[arg(long)]
        blue: Option<PathBuf>,
        /// Index: ndvi, rvi, savi, evi
        #[arg(short, long, default_value = "ndvi")]
        index: String,
    },
    /// Build a validity mask from a scene classification
    Mask {
        /// Scene classification file (SCL codes 0-11)
        input: PathBuf,
        /// Output file (1 = valid, 0 = excluded)
        output: PathBuf,
        /// Excluded classification groups, comma separated
        #[arg(long, default_value = "cloud")]
        exclude: String,
        /// Exclusion buffer half-width in pixels
        #[arg(short, long, default_value = "20")]
        buffer: usize,
        /// Skip the exclusion buffer entirely
        #[arg(long)]
        no_buffer: bool,
    },
    /// Trace a zone mask into GeoJSON outlines
    Trace {
        /// Input zone mask (1 = inside)
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Iso level, strictly between 0 and 1
        #[arg(short, long, default_value = "0.8")]
        level: f64,
        /// Simplification tolerance in pixels (0 keeps every vertex)
        #[arg(short, long, default_value = "1.0")]
        tolerance: f64,
    },
    /// Full pipeline: bands to zoned GeoJSON features
    Zones {
        /// Output GeoJSON file
        output: PathBuf,
        /// NIR band file (B08, 10 m)
        #[arg(long)]
        nir: PathBuf,
        /// Red band file (B04, 10 m)
        #[arg(long)]
        red: PathBuf,
        /// Blue band file (B02, 10 m), needed for EVI
        #[arg(long)]
        blue: Option<PathBuf>,
        /// Scene classification file (SCL, 20 m)
        #[arg(long)]
        scl: Option<PathBuf>,
        /// Index: ndvi, rvi, savi, evi
        #[arg(short, long, default_value = "ndvi")]
        index: String,
        /// Threshold cascade as "label=value,...", strictly descending
        #[arg(long, default_value = "healthy=0.6,moderate=0.4,weak=0.25")]
        thresholds: String,
        /// Iso level for contour tracing, strictly between 0 and 1
        #[arg(short, long, default_value = "0.8")]
        level: f64,
        /// Simplification tolerance in pixels (0 keeps every vertex)
        #[arg(short, long, default_value = "1.0")]
        tolerance: f64,
        /// Excluded classification groups, comma separated
        #[arg(long, default_value = "cloud")]
        exclude: String,
        /// Exclusion buffer half-width in pixels
        #[arg(short, long, default_value = "20")]
        buffer: usize,
        /// Skip the exclusion buffer entirely
        #[arg(long)]
        no_buffer: bool,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_band(path: &PathBuf) -> Result<Raster<f64>> {
    let pb = spinner("Reading band...");
    let raster: Raster<f64> = read_geotiff(path).context("Failed to read band")?;
    pb.finish_and_clear();
    info!("{}: {} x {}", path.display(), raster.cols(), raster.rows());
    Ok(raster)
}

fn read_scene(path: &PathBuf) -> Result<Raster<u16>> {
    let pb = spinner("Reading scene classification...");
    let raster: Raster<u16> = read_geotiff(path).context("Failed to read scene classification")?;
    pb.finish_and_clear();
    Ok(raster)
}

fn read_mask(path: &PathBuf) -> Result<Raster<u8>> {
    let pb = spinner("Reading mask...");
    let raster: Raster<u8> = read_geotiff(path).context("Failed to read mask")?;
    pb.finish_and_clear();
    Ok(raster)
}

fn write_raster(raster: &Raster<f64>, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn write_mask(raster: &Raster<u8>, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn write_geojson(collection: &FeatureCollection, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing GeoJSON...");
    let text = collection
        .to_geojson()
        .context("Failed to serialize features")?;
    std::fs::write(path, text).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_index(s: &str) -> Result<VegetationIndex> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Unknown index: {}. Use ndvi, rvi, savi, or evi.", s))
}

fn parse_classes(s: &str) -> Result<Vec<MaskClass>> {
    s.split(',')
        .map(|name| {
            name.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "Unknown classification group: {}. Use cloud, vegetation, water, non-vegetation, snow, or other.",
                    name.trim()
                )
            })
        })
        .collect()
}

fn parse_thresholds(s: &str) -> Result<Vec<ZoneThreshold>> {
    s.split(',')
        .map(|pair| {
            let (label, value) = pair
                .trim()
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Threshold must be 'label=value', got: {}", pair))?;
            let value: f64 = value.trim().parse().context("Invalid threshold value")?;
            Ok(ZoneThreshold::new(label.trim(), value))
        })
        .collect()
}

fn buffer_element(no_buffer: bool, half_width: usize) -> Option<StructuringElement> {
    if no_buffer {
        None
    } else {
        Some(StructuringElement::Square(half_width))
    }
}

fn load_tile(
    nir: &PathBuf,
    red: &PathBuf,
    blue: Option<&PathBuf>,
    scl: Option<&PathBuf>,
) -> Result<TileBands> {
    let mut tile = TileBands::new();
    tile.bands.insert(BandId::B08, read_band(nir)?);
    tile.bands.insert(BandId::B04, read_band(red)?);
    if let Some(path) = blue {
        tile.bands.insert(BandId::B02, read_band(path)?);
    }
    if let Some(path) = scl {
        tile.scl = Some(read_scene(path)?);
    }
    Ok(tile)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster = read_band(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        // ── Index ────────────────────────────────────────────────────
        Commands::Index {
            output,
            nir,
            red,
            blue,
            index,
        } => {
            let index = parse_index(&index)?;
            let label = index.to_string().to_uppercase();
            if index.required_bands().contains(&BandId::B02) && blue.is_none() {
                anyhow::bail!("{} needs the blue band. Pass --blue.", label);
            }

            let tile = load_tile(&nir, &red, blue.as_ref(), None)?;
            let start = Instant::now();
            let reference = reference_shape(&tile)?;
            let stack =
                harmonized_stack(&tile.bands, reference).context("Failed to harmonize bands")?;
            let result = index.compute(&stack).context("Failed to compute index")?;
            let elapsed = start.elapsed();
            write_raster(&result, &output)?;
            done(&label, &output, elapsed);
        }

        // ── Mask ─────────────────────────────────────────────────────
        Commands::Mask {
            input,
            output,
            exclude,
            buffer,
            no_buffer,
        } => {
            let params = MaskParams {
                classes: parse_classes(&exclude)?,
                buffer: buffer_element(no_buffer, buffer),
            };
            let scl = read_scene(&input)?;
            let start = Instant::now();
            let mask = validity_mask(&scl, &params).context("Failed to build validity mask")?;
            let elapsed = start.elapsed();

            let excluded = mask.data().iter().filter(|&&v| v == 0).count();
            info!(
                "Excluded {:.1}% of the scene",
                100.0 * excluded as f64 / mask.len() as f64
            );
            write_mask(&mask, &output)?;
            done("Validity mask", &output, elapsed);
        }

        // ── Trace ────────────────────────────────────────────────────
        Commands::Trace {
            input,
            output,
            level,
            tolerance,
        } => {
            let mask = read_mask(&input)?;
            let start = Instant::now();
            let contours = trace_contours(&mask, &TraceParams { level })
                .context("Failed to trace outlines")?;
            let simplified =
                simplify_contours(&contours, tolerance).context("Failed to simplify outlines")?;
            let elapsed = start.elapsed();

            let mut collection = FeatureCollection::new();
            for contour in &simplified {
                if let Some(geometry) = contour_geometry(contour, mask.transform()) {
                    let mut feature = Feature::new(geometry);
                    feature.set_property("level", AttributeValue::Float(level));
                    collection.push(feature);
                }
            }
            info!("Traced {} outlines", collection.len());
            write_geojson(&collection, &output)?;
            done("Outlines", &output, elapsed);
        }

        // ── Zones ────────────────────────────────────────────────────
        Commands::Zones {
            output,
            nir,
            red,
            blue,
            scl,
            index,
            thresholds,
            level,
            tolerance,
            exclude,
            buffer,
            no_buffer,
        } => {
            let index = parse_index(&index)?;
            if index.required_bands().contains(&BandId::B02) && blue.is_none() {
                anyhow::bail!(
                    "{} needs the blue band. Pass --blue.",
                    index.to_string().to_uppercase()
                );
            }

            let params = PipelineParams {
                index,
                mask: MaskParams {
                    classes: parse_classes(&exclude)?,
                    buffer: buffer_element(no_buffer, buffer),
                },
                zones: ZoneParams {
                    thresholds: parse_thresholds(&thresholds)?,
                },
                trace: TraceParams { level },
                simplify_tolerance: tolerance,
            };

            let tile = load_tile(&nir, &red, blue.as_ref(), scl.as_ref())?;
            let start = Instant::now();
            let pb = spinner("Processing tile...");
            let collection = zone_features(&tile, &params).context("Failed to process tile")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            println!("Features: {}", collection.len());
            write_geojson(&collection, &output)?;
            done("Zone features", &output, elapsed);
        }
    }

    Ok(())
}
