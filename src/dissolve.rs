//! Dissolve engine
//!
//! Merges each county's owned zones into its boundary geometry and writes
//! the result back through the county index. Merge failure for one county is
//! deliberately non-fatal: rather than dropping the zones (or aborting a
//! run that is otherwise sound), the engine appends them as a fallback
//! record under the same GEOID and reports the degradation as a warning.
//! Whether to merge branches on a declared condition, geometry validity,
//! checked before the union runs.

use std::collections::HashMap;

use geo::{BooleanOps, MultiPolygon, Validation};
use log::{debug, warn};

use crate::county::{CountyIndex, GeoId};
use crate::error::{Error, Result};
use crate::zone::{Zone, ZoneId};

/// How one county's owned zones were applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Zones were unioned into the county boundary
    Merged {
        /// Number of zones dissolved in
        zones: usize,
    },
    /// Union was not attempted or produced nothing; zones were appended as
    /// a separate record under the same GEOID
    Fallback {
        /// Number of zones in the fallback record
        zones: usize,
    },
}

/// Counts reported after a dissolve pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DissolveSummary {
    /// Counties whose owned-zone list was non-empty
    pub counties_touched: usize,
    /// Zones unioned into a county boundary
    pub zones_merged: usize,
    /// Counties that degraded to a fallback record
    pub fallbacks: usize,
}

/// Merge every county's owned zones into its boundary
///
/// Counties absent from `owned` (or with empty lists) are never touched, so
/// their geometry stays identical to its loaded state. An owned zone id that
/// names no zone is a corrupted relation and aborts the run; dropping the
/// geometry silently is never acceptable. Processing order is sorted by
/// GEOID for deterministic logs and fallback ordering.
pub fn dissolve_owned(
    index: &mut CountyIndex,
    zones: &[Zone],
    owned: &HashMap<GeoId, Vec<ZoneId>>,
) -> Result<DissolveSummary> {
    let by_id: HashMap<ZoneId, &Zone> = zones.iter().map(|z| (z.id, z)).collect();

    let mut geoids: Vec<GeoId> = owned.keys().copied().collect();
    geoids.sort();

    let mut summary = DissolveSummary::default();
    for geoid in geoids {
        let zone_ids = &owned[&geoid];
        if zone_ids.is_empty() {
            continue;
        }
        summary.counties_touched += 1;

        let mut parts: Vec<&MultiPolygon<f64>> = Vec::with_capacity(zone_ids.len());
        for &zone_id in zone_ids {
            let zone = by_id
                .get(&zone_id)
                .copied()
                .ok_or(Error::AdjacencyInconsistent {
                    zone: zone_id,
                    geoid,
                })?;
            parts.push(&zone.geometry);
        }

        match dissolve_into(index, geoid, &parts)? {
            MergeOutcome::Merged { zones } => {
                debug!("county {geoid}: dissolved {zones} border zones");
                summary.zones_merged += zones;
            }
            MergeOutcome::Fallback { zones } => {
                warn!(
                    "county {geoid}: merge failed, appending {zones} border zones \
                     as a separate record under the same GEOID"
                );
                summary.fallbacks += 1;
            }
        }
    }

    Ok(summary)
}

/// Union zone geometries into one county's boundary, or fall back
///
/// The merge only runs when the current boundary and every zone geometry
/// pass validity; an invalid input, or a union that comes back empty, takes
/// the fallback path instead. Fallback records concatenate the zone
/// polygons without any boolean operation, so no geometry is ever lost.
fn dissolve_into(
    index: &mut CountyIndex,
    geoid: GeoId,
    parts: &[&MultiPolygon<f64>],
) -> Result<MergeOutcome> {
    let boundary = index.boundary_of(geoid)?;

    let mergeable = boundary.is_valid() && parts.iter().all(|p| p.is_valid());
    if mergeable {
        let mut merged = boundary.clone();
        for &part in parts {
            merged = merged.union(part);
        }
        if !merged.0.is_empty() {
            index.set_boundary(geoid, merged)?;
            return Ok(MergeOutcome::Merged { zones: parts.len() });
        }
    }

    index.push_fallback(geoid, concatenate(parts));
    Ok(MergeOutcome::Fallback { zones: parts.len() })
}

fn concatenate(parts: &[&MultiPolygon<f64>]) -> MultiPolygon<f64> {
    MultiPolygon(
        parts
            .iter()
            .flat_map(|mp| mp.0.iter().cloned())
            .collect(),
    )
}
