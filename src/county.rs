//! County keys, layer loading, and the mutable county index
//!
//! Two parallel county datasets feed a run: the rasterized-then-vectorized
//! layer whose stable geometry drives topological joins (and which is
//! mutated in place as zones dissolve in), and the authoritative layer whose
//! precise geometry is only consulted for shared-area comparison. Both are
//! keyed by GEOID, normalized to one numeric type regardless of whether the
//! source property was a string or an integer.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::{Error, Result};

/// Normalized county identifier
///
/// GEOIDs arrive as strings on authoritative census layers and as integer
/// grid codes on rasterized layers; both normalize to the same numeric key.
/// Totally ordered so tie-breaks and iteration order are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeoId(u64);

impl GeoId {
    /// Create a GeoId from its numeric form
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Numeric form of the key
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Normalize a GeoJSON property value (string or integer) into a GeoId
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Number(n) => n
                .as_u64()
                .map(GeoId)
                .ok_or_else(|| Error::BadGeoid(value.to_string())),
            JsonValue::String(s) => s.parse(),
            _ => Err(Error::BadGeoid(value.to_string())),
        }
    }
}

impl FromStr for GeoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(GeoId)
            .map_err(|_| Error::BadGeoid(s.to_string()))
    }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One county record: key plus polygon geometry
#[derive(Debug, Clone)]
pub struct CountyFeature {
    /// Normalized county key
    pub geoid: GeoId,
    /// County footprint; single polygons are wrapped for uniformity
    pub geometry: MultiPolygon<f64>,
}

/// Read a county layer from a GeoJSON file
///
/// Keeps only the key property and the geometry; all other attributes are
/// dropped, mirroring the column subsetting the pipeline has always done.
///
/// # Arguments
///
/// * `path` - GeoJSON file holding a FeatureCollection
/// * `key_property` - Property carrying the county key (`GEOID` on
///   authoritative layers, `gridcode` on rasterized layers)
pub fn read_layer(path: &Path, key_property: &str) -> Result<Vec<CountyFeature>> {
    let contents = fs::read_to_string(path)?;
    let geojson: GeoJson = contents.parse()?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(Error::NotAFeatureCollection),
    };
    features_from_collection(collection, key_property)
}

/// Convert a parsed FeatureCollection into county features
pub fn features_from_collection(
    collection: geojson::FeatureCollection,
    key_property: &str,
) -> Result<Vec<CountyFeature>> {
    let mut counties = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let key = feature
            .property(key_property)
            .ok_or_else(|| Error::MissingKeyProperty {
                index,
                property: key_property.to_string(),
            })?;
        let geoid = GeoId::from_json(key)?;

        let geometry = feature
            .geometry
            .ok_or(Error::MissingGeometry { index })?;
        let geometry = match Geometry::<f64>::try_from(geometry.value)? {
            Geometry::Polygon(p) => MultiPolygon(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            other => {
                return Err(Error::UnsupportedGeometry {
                    index,
                    found: geometry_kind(&other),
                })
            }
        };

        counties.push(CountyFeature { geoid, geometry });
    }
    Ok(counties)
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// In-memory county lookup: GEOID to current boundary geometry
///
/// Initialized from the rasterized-join layer, mutated in place as zones
/// dissolve in, and written out as the final corrected layer. The parallel
/// authoritative geometries are read-only. Counties whose merge fails keep
/// their original boundary and gain a fallback record instead; the writer
/// emits fallback records as additional rows under the same GEOID.
#[derive(Debug)]
pub struct CountyIndex {
    boundaries: HashMap<GeoId, MultiPolygon<f64>>,
    authoritative: HashMap<GeoId, MultiPolygon<f64>>,
    fallback: Vec<(GeoId, MultiPolygon<f64>)>,
}

impl CountyIndex {
    /// Build the index from the two parallel county layers
    ///
    /// Fails fast with [`Error::CountyCountMismatch`] if either layer does
    /// not hold exactly `config.expected_county_count` counties, and with
    /// [`Error::DuplicateGeoid`] if a key repeats within a layer.
    pub fn load(
        rasterized: Vec<CountyFeature>,
        authoritative: Vec<CountyFeature>,
        config: &Config,
    ) -> Result<Self> {
        if rasterized.len() != config.expected_county_count {
            return Err(Error::CountyCountMismatch {
                expected: config.expected_county_count,
                actual: rasterized.len(),
            });
        }
        if authoritative.len() != config.expected_county_count {
            return Err(Error::CountyCountMismatch {
                expected: config.expected_county_count,
                actual: authoritative.len(),
            });
        }

        Ok(Self {
            boundaries: keyed(rasterized)?,
            authoritative: keyed(authoritative)?,
            fallback: Vec::new(),
        })
    }

    /// All county keys, sorted for deterministic iteration
    pub fn all_ids(&self) -> Vec<GeoId> {
        let mut ids: Vec<GeoId> = self.boundaries.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Current boundary geometry for a county
    pub fn boundary_of(&self, geoid: GeoId) -> Result<&MultiPolygon<f64>> {
        self.boundaries
            .get(&geoid)
            .ok_or(Error::UnknownCounty(geoid))
    }

    /// Replace a county's boundary geometry
    pub fn set_boundary(&mut self, geoid: GeoId, geometry: MultiPolygon<f64>) -> Result<()> {
        match self.boundaries.get_mut(&geoid) {
            Some(entry) => {
                *entry = geometry;
                Ok(())
            }
            None => Err(Error::UnknownCounty(geoid)),
        }
    }

    /// Authoritative (precise) geometry for a county, used only for
    /// shared-area comparison
    pub fn authoritative_of(&self, geoid: GeoId) -> Result<&MultiPolygon<f64>> {
        self.authoritative
            .get(&geoid)
            .ok_or(Error::MissingAuthoritative(geoid))
    }

    /// Record zones that could not be merged into their county's boundary;
    /// the writer emits these as extra rows under the same GEOID
    pub fn push_fallback(&mut self, geoid: GeoId, geometry: MultiPolygon<f64>) {
        self.fallback.push((geoid, geometry));
    }

    /// Fallback records accumulated so far
    pub fn fallback_records(&self) -> &[(GeoId, MultiPolygon<f64>)] {
        &self.fallback
    }

    /// Number of counties in the index
    pub fn county_count(&self) -> usize {
        self.boundaries.len()
    }
}

fn keyed(features: Vec<CountyFeature>) -> Result<HashMap<GeoId, MultiPolygon<f64>>> {
    let mut map = HashMap::with_capacity(features.len());
    for feature in features {
        if map.insert(feature.geoid, feature.geometry).is_some() {
            return Err(Error::DuplicateGeoid(feature.geoid));
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn county(id: u64) -> CountyFeature {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        CountyFeature {
            geoid: GeoId::new(id),
            geometry: MultiPolygon(vec![square]),
        }
    }

    #[test]
    fn test_geoid_from_string_and_number() {
        let from_str = GeoId::from_json(&serde_json::json!("24001")).unwrap();
        let from_num = GeoId::from_json(&serde_json::json!(24001)).unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_str.as_u64(), 24001);
    }

    #[test]
    fn test_geoid_rejects_non_numeric() {
        assert!(matches!(
            GeoId::from_json(&serde_json::json!("not-a-geoid")),
            Err(Error::BadGeoid(_))
        ));
        assert!(matches!(
            GeoId::from_json(&serde_json::json!(-3)),
            Err(Error::BadGeoid(_))
        ));
    }

    #[test]
    fn test_load_validates_county_count() {
        let config = Config::with_expected_count(2);
        let result = CountyIndex::load(vec![county(1)], vec![county(1)], &config);
        assert!(matches!(
            result,
            Err(Error::CountyCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_load_rejects_duplicate_keys() {
        let config = Config::with_expected_count(2);
        let result = CountyIndex::load(
            vec![county(1), county(1)],
            vec![county(1), county(2)],
            &config,
        );
        assert!(matches!(result, Err(Error::DuplicateGeoid(_))));
    }

    #[test]
    fn test_set_boundary_replaces_entry() {
        let config = Config::with_expected_count(2);
        let mut index = CountyIndex::load(
            vec![county(1), county(2)],
            vec![county(1), county(2)],
            &config,
        )
        .unwrap();

        let replacement = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ]]);
        index
            .set_boundary(GeoId::new(1), replacement.clone())
            .unwrap();
        assert_eq!(index.boundary_of(GeoId::new(1)).unwrap(), &replacement);
    }

    #[test]
    fn test_unknown_county_lookup_fails() {
        let config = Config::with_expected_count(1);
        let index = CountyIndex::load(vec![county(1)], vec![county(1)], &config).unwrap();
        assert!(matches!(
            index.boundary_of(GeoId::new(9)),
            Err(Error::UnknownCounty(_))
        ));
    }

    #[test]
    fn test_all_ids_sorted() {
        let config = Config::with_expected_count(3);
        let index = CountyIndex::load(
            vec![county(3), county(1), county(2)],
            vec![county(1), county(2), county(3)],
            &config,
        )
        .unwrap();
        let ids: Vec<u64> = index.all_ids().iter().map(|g| g.as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
