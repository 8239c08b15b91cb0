//! Output serialization
//!
//! Serializes the final county index to a single GeoJSON FeatureCollection:
//! one feature per county, plus one feature per fallback record. Fallback
//! features repeat the GEOID of their county; downstream consumers merge
//! duplicates if they need one row per county. This is documented behavior,
//! not silently corrected here.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use log::info;

use crate::county::{CountyIndex, GeoId};
use crate::error::Result;

/// Build the output FeatureCollection from the final index
///
/// Counties are emitted in GEOID order, followed by fallback records in the
/// order they were pushed.
pub fn to_feature_collection(index: &CountyIndex) -> Result<FeatureCollection> {
    let mut features = Vec::with_capacity(index.county_count() + index.fallback_records().len());
    for geoid in index.all_ids() {
        features.push(county_feature(geoid, index.boundary_of(geoid)?));
    }
    for (geoid, geometry) in index.fallback_records() {
        features.push(county_feature(*geoid, geometry));
    }

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Write the final index to a GeoJSON file
pub fn write_index(index: &CountyIndex, path: &Path) -> Result<()> {
    let collection = to_feature_collection(index)?;
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), &collection)?;
    info!(
        "wrote {} county features ({} fallback records) to {}",
        collection.features.len(),
        index.fallback_records().len(),
        path.display()
    );
    Ok(())
}

fn county_feature(geoid: GeoId, geometry: &geo::MultiPolygon<f64>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("GEOID".to_string(), serde_json::json!(geoid.as_u64()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::county::CountyFeature;
    use geo::{polygon, MultiPolygon};

    fn square(minx: f64, miny: f64, maxx: f64, maxy: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: minx, y: miny),
            (x: maxx, y: miny),
            (x: maxx, y: maxy),
            (x: minx, y: maxy),
        ]])
    }

    fn index_of(features: Vec<CountyFeature>) -> CountyIndex {
        let config = Config::with_expected_count(features.len());
        CountyIndex::load(features.clone(), features, &config).unwrap()
    }

    #[test]
    fn test_collection_emits_one_feature_per_county() {
        let index = index_of(vec![
            CountyFeature {
                geoid: GeoId::new(2),
                geometry: square(2.0, 0.0, 4.0, 2.0),
            },
            CountyFeature {
                geoid: GeoId::new(1),
                geometry: square(0.0, 0.0, 2.0, 2.0),
            },
        ]);
        let collection = to_feature_collection(&index).unwrap();
        assert_eq!(collection.features.len(), 2);
        // GEOID order
        let ids: Vec<u64> = collection
            .features
            .iter()
            .map(|f| f.property("GEOID").unwrap().as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_fallback_records_duplicate_geoid() {
        let mut index = index_of(vec![CountyFeature {
            geoid: GeoId::new(1),
            geometry: square(0.0, 0.0, 2.0, 2.0),
        }]);
        index.push_fallback(GeoId::new(1), square(2.0, 0.0, 3.0, 1.0));

        let collection = to_feature_collection(&index).unwrap();
        assert_eq!(collection.features.len(), 2);
        let ids: Vec<u64> = collection
            .features
            .iter()
            .map(|f| f.property("GEOID").unwrap().as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 1]);
    }
}
