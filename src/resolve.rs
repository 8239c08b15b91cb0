//! Zone/county adjacency and ownership resolution
//!
//! The spatial join between the rasterized-join county layer and the zone
//! set runs once, producing a many-to-many adjacency relation held from both
//! directions. Ownership is then resolved in two passes: a pure zone→owner
//! map (parallel, read-only), followed by grouping owners into per-county
//! dissolve lists. A zone touching one county belongs to it outright with no
//! area computation; a zone touching several goes to the county whose
//! **authoritative** geometry shares the most area with it, and is excluded
//! from every other county's list. Exact ties go to the lowest GEOID.
//!
//! Because both directions of the relation are derived from the same
//! intersection pass, per-county work is bounded by that county's candidate
//! list by construction; [`Adjacency::verify`] still cross-checks the two
//! directions so a corrupted relation aborts the run instead of silently
//! producing a wrong assignment.

use std::collections::HashMap;

use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon, Rect};
use log::debug;
use rayon::prelude::*;

use crate::county::{CountyIndex, GeoId};
use crate::error::{Error, Result};
use crate::zone::{Zone, ZoneId};

/// The zone↔county adjacency relation, computed once per run
#[derive(Debug, Default)]
pub struct Adjacency {
    county_zones: HashMap<GeoId, Vec<ZoneId>>,
    zone_counties: HashMap<ZoneId, Vec<GeoId>>,
}

impl Adjacency {
    /// Spatial join (intersects predicate) between the county index's
    /// current boundaries and the zone set
    ///
    /// Bounding boxes reject non-overlapping pairs before the full
    /// intersection test runs. Zones intersecting no county simply never
    /// enter the relation; they are discarded downstream.
    pub fn build(index: &CountyIndex, zones: &[Zone]) -> Result<Self> {
        let zone_boxes: Vec<Option<Rect<f64>>> =
            zones.iter().map(|z| z.geometry.bounding_rect()).collect();

        let mut adjacency = Self::default();
        for geoid in index.all_ids() {
            let boundary = index.boundary_of(geoid)?;
            let county_box = match boundary.bounding_rect() {
                Some(rect) => rect,
                None => continue,
            };
            for (zone, zone_box) in zones.iter().zip(&zone_boxes) {
                let zone_box = match zone_box {
                    Some(rect) => rect,
                    None => continue,
                };
                if boxes_disjoint(&county_box, zone_box) {
                    continue;
                }
                if boundary.intersects(&zone.geometry) {
                    adjacency
                        .county_zones
                        .entry(geoid)
                        .or_default()
                        .push(zone.id);
                    adjacency
                        .zone_counties
                        .entry(zone.id)
                        .or_default()
                        .push(geoid);
                }
            }
        }

        debug!(
            "adjacency: {} counties touch {} zones",
            adjacency.county_zones.len(),
            adjacency.zone_counties.len()
        );
        Ok(adjacency)
    }

    /// Assemble an adjacency relation from precomputed lists
    ///
    /// Exists for replaying recorded joins and for constructing corrupted
    /// relations in invariant tests; [`Adjacency::build`] is the normal
    /// path.
    pub fn from_parts(
        county_zones: HashMap<GeoId, Vec<ZoneId>>,
        zone_counties: HashMap<ZoneId, Vec<GeoId>>,
    ) -> Self {
        Self {
            county_zones,
            zone_counties,
        }
    }

    /// Distinct zones touching a county
    pub fn zones_of(&self, geoid: GeoId) -> &[ZoneId] {
        self.county_zones.get(&geoid).map_or(&[], Vec::as_slice)
    }

    /// Distinct counties touching a zone
    pub fn counties_of(&self, zone: ZoneId) -> &[GeoId] {
        self.zone_counties.get(&zone).map_or(&[], Vec::as_slice)
    }

    /// Number of zones touching at least one county
    pub fn touched_zone_count(&self) -> usize {
        self.zone_counties.len()
    }

    /// Cross-check the two directions of the relation
    ///
    /// Every (county, zone) edge must appear in both maps. A mismatch means
    /// the relation was corrupted after the join and resolution must abort
    /// rather than produce a partially-correct output.
    pub fn verify(&self) -> Result<()> {
        for (&geoid, zones) in &self.county_zones {
            for &zone in zones {
                if !self.counties_of(zone).contains(&geoid) {
                    return Err(Error::AdjacencyInconsistent { zone, geoid });
                }
            }
        }
        for (&zone, counties) in &self.zone_counties {
            for &geoid in counties {
                if !self.zones_of(geoid).contains(&zone) {
                    return Err(Error::AdjacencyInconsistent { zone, geoid });
                }
            }
        }
        Ok(())
    }
}

fn boxes_disjoint(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.max().x < b.min().x
        || a.min().x > b.max().x
        || a.max().y < b.min().y
        || a.min().y > b.max().y
}

/// Resolve the owning county for every zone in the adjacency relation
///
/// Pure with respect to the index (read-only) and parallel across zones.
/// Zones touching exactly one county take it without any area computation.
/// Zones touching several take the county with strictly maximal shared area
/// against the authoritative geometries; exact ties resolve to the lowest
/// GEOID. Zero shared area for every candidate is a fatal inconsistency
/// ([`Error::ZeroSharedArea`]): the topological join claimed adjacency the
/// geometry cannot back up.
pub fn resolve_owners(
    zones: &[Zone],
    index: &CountyIndex,
    adjacency: &Adjacency,
) -> Result<HashMap<ZoneId, GeoId>> {
    adjacency.verify()?;

    let by_id: HashMap<ZoneId, &Zone> = zones.iter().map(|z| (z.id, z)).collect();

    let mut touched: Vec<ZoneId> = adjacency.zone_counties.keys().copied().collect();
    touched.sort();

    let owners: Vec<(ZoneId, GeoId)> = touched
        .par_iter()
        .map(|&zone_id| {
            let mut candidates: Vec<GeoId> = adjacency.counties_of(zone_id).to_vec();
            candidates.sort();
            candidates.dedup();

            if candidates.len() == 1 {
                // Single-county fast path: no area computation
                return Ok((zone_id, candidates[0]));
            }

            let zone = by_id
                .get(&zone_id)
                .copied()
                .ok_or(Error::AdjacencyInconsistent {
                    zone: zone_id,
                    geoid: candidates[0],
                })?;
            let owner = select_by_shared_area(zone, &candidates, index)?;
            Ok((zone_id, owner))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(owners.into_iter().collect())
}

/// Pick the candidate county sharing the most area with the zone
///
/// Candidates must be sorted ascending; only a strictly greater area
/// replaces the current best, so equal areas fall to the lowest GEOID.
fn select_by_shared_area(
    zone: &Zone,
    candidates: &[GeoId],
    index: &CountyIndex,
) -> Result<GeoId> {
    let mut best: Option<(GeoId, f64)> = None;
    for &geoid in candidates {
        let authoritative = index.authoritative_of(geoid)?;
        let shared = shared_area(&zone.geometry, authoritative);
        if best.map_or(shared > 0.0, |(_, area)| shared > area) {
            best = Some((geoid, shared));
        }
    }
    match best {
        Some((geoid, _)) => Ok(geoid),
        None => Err(Error::ZeroSharedArea {
            zone: zone.id,
            geoid: candidates[0],
        }),
    }
}

/// Area of geometric intersection between a zone and a county, in square
/// map units (planar CRS assumed)
pub fn shared_area(zone: &MultiPolygon<f64>, county: &MultiPolygon<f64>) -> f64 {
    county.intersection(zone).unsigned_area()
}

/// Group resolved owners into per-county dissolve lists, sorted for
/// deterministic processing
pub fn owned_zones_by_county(owners: &HashMap<ZoneId, GeoId>) -> HashMap<GeoId, Vec<ZoneId>> {
    let mut owned: HashMap<GeoId, Vec<ZoneId>> = HashMap::new();
    for (&zone, &geoid) in owners {
        owned.entry(geoid).or_default().push(zone);
    }
    for zones in owned.values_mut() {
        zones.sort();
    }
    owned
}
