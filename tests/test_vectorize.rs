use geo_border_dissolve::{vectorize_zones, GridTransform, RasterGrid};
use geo::{Area, BoundingRect};

/// Helper to build an extent raster from row-major values
fn extent(width: usize, height: usize, cells: Vec<f64>) -> RasterGrid {
    RasterGrid::new(
        width,
        height,
        cells,
        GridTransform::from_origin(0.0, height as f64, 1.0, 1.0),
    )
}

#[test]
fn test_sentinel_cells_are_not_vectorized() {
    // Grid layout (values):
    //   100  40  100
    //   100  40  100
    //
    // Only the two 40-valued cells are ambiguous border pixels.
    let mut raster = extent(3, 2, vec![100.0, 40.0, 100.0, 100.0, 40.0, 100.0]);
    raster.zero_sentinel(100.0);

    let zones = vectorize_zones(
        &raster.border_mask(),
        raster.width(),
        raster.height(),
        raster.transform(),
    );
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].geometry.unsigned_area(), 2.0);
}

#[test]
fn test_resolved_mask_suppresses_counted_cells() {
    // Both cells are border pixels, but the left one was already counted by
    // a prior process (set in the resolved mask, nodata = 0).
    let mut raster = extent(2, 1, vec![60.0, 60.0]);
    let resolved = RasterGrid::new(2, 1, vec![1.0, 0.0], GridTransform::from_origin(0.0, 1.0, 1.0, 1.0))
        .with_nodata(0.0);
    raster.zero_sentinel(100.0);
    raster.suppress_resolved(&resolved);

    let zones = vectorize_zones(
        &raster.border_mask(),
        raster.width(),
        raster.height(),
        raster.transform(),
    );
    assert_eq!(zones.len(), 1);
    let rect = zones[0].geometry.bounding_rect().unwrap();
    assert_eq!(rect.min().x, 1.0);
}

#[test]
fn test_diagonal_cells_become_separate_zones() {
    // Grid layout (border cells marked X):
    //   X .
    //   . X
    //
    // 4-connectivity: diagonal neighbors do not connect.
    let raster = extent(2, 2, vec![40.0, 0.0, 0.0, 40.0]);
    let zones = vectorize_zones(
        &raster.border_mask(),
        raster.width(),
        raster.height(),
        raster.transform(),
    );
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].id.0, 1);
    assert_eq!(zones[1].id.0, 2);
}

#[test]
fn test_zone_ids_sequential_without_gaps() {
    // Four isolated border pixels scattered over a 5x5 grid
    let mut cells = vec![0.0; 25];
    for &idx in &[0, 4, 12, 24] {
        cells[idx] = 50.0;
    }
    let raster = extent(5, 5, cells);
    let zones = vectorize_zones(
        &raster.border_mask(),
        raster.width(),
        raster.height(),
        raster.transform(),
    );
    let ids: Vec<u32> = zones.iter().map(|z| z.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_empty_mask_is_valid_not_an_error() {
    let raster = extent(4, 4, vec![0.0; 16]);
    let zones = vectorize_zones(
        &raster.border_mask(),
        raster.width(),
        raster.height(),
        raster.transform(),
    );
    assert!(zones.is_empty());
}

#[test]
fn test_zone_polygon_lands_in_map_coordinates() {
    // One border pixel at grid (row 0, col 1) of a 2-row grid anchored at
    // north = 2.0: the pixel spans x [1, 2], y [1, 2]
    let raster = extent(2, 2, vec![0.0, 70.0, 0.0, 0.0]);
    let zones = vectorize_zones(
        &raster.border_mask(),
        raster.width(),
        raster.height(),
        raster.transform(),
    );
    assert_eq!(zones.len(), 1);
    let rect = zones[0].geometry.bounding_rect().unwrap();
    assert_eq!((rect.min().x, rect.min().y), (1.0, 1.0));
    assert_eq!((rect.max().x, rect.max().y), (2.0, 2.0));
}
