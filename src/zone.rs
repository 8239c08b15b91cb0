//! Zone vectorization
//!
//! Converts the boolean border mask into discrete polygon zones, one per
//! maximal connected region of set cells. Connectivity is **4-connected**
//! (edge-sharing neighbors only), matching the vectorization convention of
//! the upstream raster collaborator; diagonally-touching regions become
//! separate zones. Zone ids are assigned sequentially from 1 in row-major
//! discovery order, with no gaps.

use std::collections::VecDeque;
use std::fmt;

use geo::{LineString, MultiPolygon, Polygon};

use crate::boundary::{point_in_ring, ring_signed_area, trace_component_rings};
use crate::raster::GridTransform;

/// Unique zone identifier, assigned in creation order starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A border-pixel zone: a connected-component polygon in map coordinates
///
/// The raster cell value is discarded during vectorization; a zone carries
/// only its id and geometry. The geometry is almost always a single polygon
/// (possibly with holes), but degenerate pinched components can split into
/// multiple parts, so a `MultiPolygon` holds it uniformly.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Sequential id, 1-based, in discovery order
    pub id: ZoneId,
    /// Zone footprint in map coordinates
    pub geometry: MultiPolygon<f64>,
}

/// Vectorize a boolean border mask into zones
///
/// # Arguments
///
/// * `mask` - Row-major boolean mask, `true` for ambiguous border cells
/// * `width` - Mask width in cells
/// * `height` - Mask height in cells
/// * `transform` - Affine transform from grid to map coordinates
///
/// # Returns
///
/// Zones ordered by id (1..N). An empty mask yields an empty vector, which
/// is a valid outcome, not an error.
///
/// # Panics
///
/// Panics if `mask.len() != width * height`.
///
/// # Example
///
/// ```
/// use geo_border_dissolve::{vectorize_zones, GridTransform};
///
/// // Two diagonally-touching cells: separate zones under 4-connectivity
/// let mask = vec![true, false, false, true];
/// let zones = vectorize_zones(&mask, 2, 2, GridTransform::identity());
/// assert_eq!(zones.len(), 2);
/// assert_eq!(zones[0].id.0, 1);
/// assert_eq!(zones[1].id.0, 2);
/// ```
pub fn vectorize_zones(
    mask: &[bool],
    width: usize,
    height: usize,
    transform: GridTransform,
) -> Vec<Zone> {
    assert_eq!(
        mask.len(),
        width * height,
        "mask length must equal width * height"
    );

    let (labels, count) = label_components(mask, width, height);

    let mut zones = Vec::with_capacity(count as usize);
    for label in 1..=count {
        let rings = trace_component_rings(&labels, width, height, label);
        let geometry = assemble_polygons(rings, transform);
        zones.push(Zone {
            id: ZoneId(label),
            geometry,
        });
    }

    // The label array can be as large as the raster; release it before
    // returning rather than letting it ride along the call stack.
    drop(labels);

    zones
}

/// Label 4-connected components of set cells
///
/// Returns the label grid (0 = unset) and the number of components found.
/// Labels run 1..=count in row-major discovery order.
fn label_components(mask: &[bool], width: usize, height: usize) -> (Vec<u32>, u32) {
    let mut labels = vec![0u32; mask.len()];
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for start in 0..mask.len() {
        if !mask[start] || labels[start] != 0 {
            continue;
        }
        count += 1;
        labels[start] = count;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            let row = idx / width;
            let col = idx % width;
            let mut visit = |r: usize, c: usize| {
                let n = r * width + c;
                if mask[n] && labels[n] == 0 {
                    labels[n] = count;
                    queue.push_back(n);
                }
            };
            if row > 0 {
                visit(row - 1, col);
            }
            if row + 1 < height {
                visit(row + 1, col);
            }
            if col > 0 {
                visit(row, col - 1);
            }
            if col + 1 < width {
                visit(row, col + 1);
            }
        }
    }

    (labels, count)
}

/// Build a component's polygons from its traced rings
///
/// Rings with positive grid-space area are exteriors, negative are holes.
/// Each hole attaches to the smallest exterior that contains its first
/// vertex. Containment is tested in grid space, before the transform can
/// flip orientation.
fn assemble_polygons(rings: Vec<Vec<(f64, f64)>>, transform: GridTransform) -> MultiPolygon<f64> {
    let mut exteriors: Vec<(Vec<(f64, f64)>, f64)> = Vec::new();
    let mut holes: Vec<Vec<(f64, f64)>> = Vec::new();

    for ring in rings {
        let area = ring_signed_area(&ring);
        if area > 0.0 {
            exteriors.push((ring, area));
        } else {
            holes.push(ring);
        }
    }

    // Smallest-first so each hole lands in its innermost containing exterior
    exteriors.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut hole_lists: Vec<Vec<LineString<f64>>> = vec![Vec::new(); exteriors.len()];
    for hole in holes {
        let anchor = hole[0];
        if let Some(i) = exteriors
            .iter()
            .position(|(ring, _)| point_in_ring(anchor, ring))
        {
            hole_lists[i].push(transform_ring(&hole, transform));
        }
    }

    let polygons = exteriors
        .iter()
        .zip(hole_lists)
        .map(|((ring, _), interiors)| Polygon::new(transform_ring(ring, transform), interiors))
        .collect();

    MultiPolygon(polygons)
}

fn transform_ring(ring: &[(f64, f64)], transform: GridTransform) -> LineString<f64> {
    ring.iter()
        .map(|&(x, y)| transform.apply(x, y))
        .collect::<Vec<(f64, f64)>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_empty_mask_yields_no_zones() {
        let zones = vectorize_zones(&[false; 9], 3, 3, GridTransform::identity());
        assert!(zones.is_empty());
    }

    #[test]
    fn test_ids_are_sequential_in_discovery_order() {
        // Three isolated cells in one row
        let mask = vec![true, false, true, false, true];
        let zones = vectorize_zones(&mask, 5, 1, GridTransform::identity());
        let ids: Vec<u32> = zones.iter().map(|z| z.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_zone_area_matches_cell_count() {
        // 2x2 block plus an isolated cell
        let mask = vec![
            true, true, false, //
            true, true, false, //
            false, false, true,
        ];
        let zones = vectorize_zones(&mask, 3, 3, GridTransform::identity());
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].geometry.unsigned_area(), 4.0);
        assert_eq!(zones[1].geometry.unsigned_area(), 1.0);
    }

    #[test]
    fn test_donut_component_keeps_hole() {
        let mask = vec![
            true, true, true, //
            true, false, true, //
            true, true, true,
        ];
        let zones = vectorize_zones(&mask, 3, 3, GridTransform::identity());
        assert_eq!(zones.len(), 1);
        let geometry = &zones[0].geometry;
        assert_eq!(geometry.0.len(), 1);
        assert_eq!(geometry.0[0].interiors().len(), 1);
        assert_eq!(geometry.unsigned_area(), 8.0);
    }

    #[test]
    fn test_transform_places_zone_in_map_space() {
        // Single cell at (row 1, col 2) of a 10m grid anchored at (500, 300)
        let mut mask = vec![false; 12];
        let idx = 4 + 2; // row 1, col 2
        mask[idx] = true;
        let transform = GridTransform::from_origin(500.0, 300.0, 10.0, 10.0);
        let zones = vectorize_zones(&mask, 4, 3, transform);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].geometry.unsigned_area(), 100.0);
        use geo::BoundingRect;
        let rect = zones[0].geometry.bounding_rect().unwrap();
        assert_eq!((rect.min().x, rect.max().y), (520.0, 290.0));
    }
}
