//! Error types for the border-dissolve pipeline
//!
//! Fatal precondition failures (bad inputs, county count mismatch) and fatal
//! invariant violations (corrupted adjacency, zero shared area) surface as
//! variants of [`Error`] and abort the run. Per-county merge failures are
//! deliberately *not* errors; they degrade to fallback records inside the
//! dissolve engine and are reported through `log::warn!`.

use thiserror::Error;

use crate::county::GeoId;
use crate::zone::ZoneId;

/// Result type for all fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a border-dissolve run
#[derive(Debug, Error)]
pub enum Error {
    /// The loaded county layer does not match the authoritative county count.
    #[error("invalid county count: expected {expected}, found {actual}")]
    CountyCountMismatch {
        /// Count the configuration declares
        expected: usize,
        /// Count actually present in the layer
        actual: usize,
    },

    /// The same GEOID appears twice within one county layer.
    #[error("duplicate GEOID {0} in county layer")]
    DuplicateGeoid(GeoId),

    /// A county key could not be normalized to a numeric GEOID.
    #[error("county key {0:?} is not a usable GEOID")]
    BadGeoid(String),

    /// A lookup referenced a GEOID the index does not hold.
    #[error("no county indexed under GEOID {0}")]
    UnknownCounty(GeoId),

    /// A zone's candidate county has no authoritative geometry to compare
    /// shared area against.
    #[error("no authoritative geometry for GEOID {0}")]
    MissingAuthoritative(GeoId),

    /// The two sides of the zone/county adjacency relation disagree.
    #[error(
        "adjacency relation inconsistent: county {geoid} lists zone {zone}, \
         but the zone does not list the county"
    )]
    AdjacencyInconsistent {
        /// Zone on the inconsistent edge
        zone: ZoneId,
        /// County on the inconsistent edge
        geoid: GeoId,
    },

    /// A topological intersection claimed adjacency but the geometric
    /// overlap with every candidate county is zero.
    #[error("shared-area analysis for zone {zone} found zero overlap with candidate county {geoid}")]
    ZeroSharedArea {
        /// Zone whose ownership could not be resolved
        zone: ZoneId,
        /// Candidate county reported for diagnostics
        geoid: GeoId,
    },

    /// A county feature arrived without any geometry.
    #[error("county feature {index} has no geometry")]
    MissingGeometry {
        /// Zero-based position of the feature in its layer
        index: usize,
    },

    /// A county feature carries a geometry type the pipeline cannot dissolve.
    #[error("county feature {index}: expected Polygon or MultiPolygon, found {found}")]
    UnsupportedGeometry {
        /// Zero-based position of the feature in its layer
        index: usize,
        /// GeoJSON type name of the offending geometry
        found: &'static str,
    },

    /// A county feature is missing the configured key property.
    #[error("county feature {index} has no {property:?} property")]
    MissingKeyProperty {
        /// Zero-based position of the feature in its layer
        index: usize,
        /// Property name that was expected to hold the county key
        property: String,
    },

    /// The input file parsed as GeoJSON but is not a FeatureCollection.
    #[error("expected a GeoJSON FeatureCollection")]
    NotAFeatureCollection,

    /// GeoJSON parsing or geometry conversion failed.
    #[error(transparent)]
    Geojson(#[from] geojson::Error),

    /// Serializing the output layer failed.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    /// Reading an input layer or writing the output layer failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
