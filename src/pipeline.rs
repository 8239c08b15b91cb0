//! End-to-end run orchestration
//!
//! Data flows strictly forward: extent raster → border mask → zones →
//! spatial join → per-zone ownership → dissolve → persisted output. No
//! stage reads back from a later one. The whole run either completes or
//! fails with a diagnostic naming the check that tripped; the only
//! contained degradation is the per-county merge fallback inside the
//! dissolve engine.

use std::path::Path;
use std::time::Instant;

use log::info;

use crate::config::Config;
use crate::county::{CountyFeature, CountyIndex};
use crate::dissolve::dissolve_owned;
use crate::error::Result;
use crate::raster::RasterGrid;
use crate::resolve::{owned_zones_by_county, resolve_owners, Adjacency};
use crate::writer::write_index;
use crate::zone::vectorize_zones;

/// Counts reported after a full run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Zones created by vectorization
    pub zones_total: usize,
    /// Zones touching no county, discarded without dissolve
    pub zones_discarded: usize,
    /// Zones unioned into a county boundary
    pub zones_dissolved: usize,
    /// Counties that received at least one zone
    pub counties_touched: usize,
    /// Counties that degraded to a fallback record
    pub fallbacks: usize,
}

/// Run the resolution pipeline in memory, returning the corrected index
///
/// # Arguments
///
/// * `extent` - Edge-extent raster; values in [0, 100], where the
///   configured sentinel means fully resolved and 0 means no data
/// * `resolved_mask` - Optional same-grid mask of cells a prior process has
///   already counted; set cells are suppressed before vectorization
/// * `rasterized` - Rasterized-then-vectorized county layer (join geometry)
/// * `authoritative` - Authoritative county layer (area comparison)
/// * `config` - Run configuration
///
/// The two county layers must each hold exactly
/// `config.expected_county_count` counties; anything else aborts before any
/// processing.
pub fn resolve_and_dissolve(
    mut extent: RasterGrid,
    resolved_mask: Option<&RasterGrid>,
    rasterized: Vec<CountyFeature>,
    authoritative: Vec<CountyFeature>,
    config: &Config,
) -> Result<(CountyIndex, RunSummary)> {
    // Reduce the extent raster to genuinely ambiguous border pixels
    extent.zero_sentinel(config.resolved_value);
    if let Some(resolved) = resolved_mask {
        extent.suppress_resolved(resolved);
    }

    info!("vectorizing border cells");
    let start = Instant::now();
    let transform = extent.transform();
    let (width, height) = (extent.width(), extent.height());
    let mask = extent.border_mask();
    drop(extent);
    let zones = vectorize_zones(&mask, width, height, transform);
    drop(mask);
    info!(
        "created {} border polygons in {:?}",
        zones.len(),
        start.elapsed()
    );

    info!("loading counties");
    let mut index = CountyIndex::load(rasterized, authoritative, config)?;

    info!("intersecting border cells with counties");
    let start = Instant::now();
    let adjacency = Adjacency::build(&index, &zones)?;
    let touched = adjacency.touched_zone_count();
    info!(
        "{} of {} zones touch a county ({:?})",
        touched,
        zones.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let owners = resolve_owners(&zones, &index, &adjacency)?;
    let owned = owned_zones_by_county(&owners);
    info!(
        "resolved owners for {} zones in {:?}",
        owners.len(),
        start.elapsed()
    );

    let dissolve = dissolve_owned(&mut index, &zones, &owned)?;

    let summary = RunSummary {
        zones_total: zones.len(),
        zones_discarded: zones.len() - touched,
        zones_dissolved: dissolve.zones_merged,
        counties_touched: dissolve.counties_touched,
        fallbacks: dissolve.fallbacks,
    };
    info!(
        "dissolved {} zones into {} counties ({} fallbacks, {} discarded)",
        summary.zones_dissolved, summary.counties_touched, summary.fallbacks,
        summary.zones_discarded
    );

    Ok((index, summary))
}

/// Run the full pipeline and write the corrected county layer
///
/// Equivalent to [`resolve_and_dissolve`] followed by serializing the final
/// index to `output` as GeoJSON.
pub fn run(
    extent: RasterGrid,
    resolved_mask: Option<&RasterGrid>,
    rasterized: Vec<CountyFeature>,
    authoritative: Vec<CountyFeature>,
    output: &Path,
    config: &Config,
) -> Result<RunSummary> {
    let (index, summary) =
        resolve_and_dissolve(extent, resolved_mask, rasterized, authoritative, config)?;
    info!("writing results");
    write_index(&index, output)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::county::GeoId;
    use crate::raster::GridTransform;
    use geo::{polygon, MultiPolygon};

    fn square(minx: f64, miny: f64, maxx: f64, maxy: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: minx, y: miny),
            (x: maxx, y: miny),
            (x: maxx, y: maxy),
            (x: minx, y: maxy),
        ]])
    }

    fn feature(id: u64, geometry: MultiPolygon<f64>) -> CountyFeature {
        CountyFeature {
            geoid: GeoId::new(id),
            geometry,
        }
    }

    #[test]
    fn test_empty_raster_is_a_valid_run() {
        // No border pixels at all: everything fully resolved
        let extent = RasterGrid::new(
            2,
            2,
            vec![100.0; 4],
            GridTransform::from_origin(0.0, 2.0, 1.0, 1.0),
        );
        let counties = vec![feature(1, square(0.0, 0.0, 2.0, 2.0))];
        let config = Config::with_expected_count(1);

        let (index, summary) =
            resolve_and_dissolve(extent, None, counties.clone(), counties, &config).unwrap();
        assert_eq!(summary.zones_total, 0);
        assert_eq!(summary.counties_touched, 0);
        assert_eq!(index.county_count(), 1);
    }

    #[test]
    fn test_zone_outside_every_county_is_discarded() {
        // One border pixel far away from the only county
        let mut cells = vec![100.0; 9];
        cells[8] = 40.0;
        let extent = RasterGrid::new(
            3,
            3,
            cells,
            GridTransform::from_origin(100.0, 103.0, 1.0, 1.0),
        );
        let counties = vec![feature(1, square(0.0, 0.0, 2.0, 2.0))];
        let config = Config::with_expected_count(1);

        let (_, summary) =
            resolve_and_dissolve(extent, None, counties.clone(), counties, &config).unwrap();
        assert_eq!(summary.zones_total, 1);
        assert_eq!(summary.zones_discarded, 1);
        assert_eq!(summary.zones_dissolved, 0);
    }
}
