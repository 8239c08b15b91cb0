//! # geo-border-dissolve
//!
//! Resolves the ambiguous boundary pixels left behind when a raster
//! land-cover mosaic of independently processed county tiles is vectorized
//! into administrative county polygons.
//!
//! Mosaicking leaves pixels along county edges whose extent value is below
//! full coverage (value ≠ 100): the pixel straddles, or was double- or
//! under-counted across, more than one county. For every such border pixel
//! this crate decides which single county it belongs to, then dissolves the
//! pixel's polygon into that county's boundary, producing a gap-free,
//! non-overlapping county layer whose feature count matches a known
//! authoritative county count.
//!
//! ## Pipeline
//!
//! 1. **Mask**: cells at the fully-resolved sentinel (100) are zeroed, and
//!    cells a prior process already counted are suppressed through a
//!    secondary mask, leaving only genuinely ambiguous border pixels.
//! 2. **Vectorize**: connected border pixels (4-connected) become polygon
//!    zones with sequential ids ([`vectorize_zones`]).
//! 3. **Join**: a one-shot spatial join against the rasterized county
//!    layer yields the zone↔county adjacency ([`Adjacency`]).
//! 4. **Resolve**: each zone gets exactly one owner: its only touching
//!    county, or among several the one sharing the most area with the
//!    zone against the *authoritative* county geometries
//!    ([`resolve_owners`]). Ties go to the lowest GEOID.
//! 5. **Dissolve**: owned zones are unioned into their county's boundary
//!    in the [`CountyIndex`]; a county whose merge fails keeps its boundary
//!    and gains a fallback record instead ([`dissolve_owned`]).
//! 6. **Write**: the final index is serialized to a GeoJSON layer, one
//!    feature per county plus any fallback rows ([`write_index`]).
//!
//! Raster aggregation/mosaicking, reprojection, and file staging are
//! external collaborators; inputs arrive as in-memory [`RasterGrid`]s and
//! GeoJSON county layers in a shared projected CRS (areas are computed in
//! planar map units).
//!
//! ## Example
//!
//! ```rust,ignore
//! use geo_border_dissolve::{run, read_layer, Config, RasterGrid};
//! use std::path::Path;
//!
//! let config = Config::default(); // 205 counties, sentinel 100
//!
//! let extent: RasterGrid = load_extent_raster();
//! let resolved: RasterGrid = load_resolved_mask();
//! let rasterized = read_layer(Path::new("counties_10m.geojson"), &config.gridcode_property)?;
//! let authoritative = read_layer(Path::new("counties.geojson"), &config.geoid_property)?;
//!
//! let summary = run(
//!     extent,
//!     Some(&resolved),
//!     rasterized,
//!     authoritative,
//!     Path::new("counties_corrected.geojson"),
//!     &config,
//! )?;
//! println!("dissolved {} border zones", summary.zones_dissolved);
//! ```
//!
//! ## Failure model
//!
//! County-count mismatches at load and corrupted adjacency relations (a
//! claimed intersection with zero geometric overlap, or a one-sided join
//! edge) abort the whole run; a partially-correct output is worse than no
//! output. A failed geometry union for a single county is contained: the
//! zones are appended as a separate record under the same GEOID, the
//! degradation is logged, and the run continues.

mod boundary;
mod config;
mod county;
mod dissolve;
mod error;
mod pipeline;
mod raster;
mod resolve;
mod writer;
mod zone;

pub use config::Config;
pub use county::{features_from_collection, read_layer, CountyFeature, CountyIndex, GeoId};
pub use dissolve::{dissolve_owned, DissolveSummary, MergeOutcome};
pub use error::{Error, Result};
pub use pipeline::{resolve_and_dissolve, run, RunSummary};
pub use raster::{GridTransform, RasterGrid};
pub use resolve::{owned_zones_by_county, resolve_owners, shared_area, Adjacency};
pub use writer::{to_feature_collection, write_index};
pub use zone::{vectorize_zones, Zone, ZoneId};
