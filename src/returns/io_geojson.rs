// County shapes: labels each feature with the canonical county name so that
// the map layer can join the shapes with the dataset.

use std::fs;

use geojson::{FeatureCollection, GeoJson};

use crate::returns::io_common::simplify_file_name;
use crate::returns::*;

// Census files use NAME20 for the 2020 vintage and NAME for the older ones.
const NAME_PROPERTIES: [&str; 2] = ["NAME20", "NAME"];

pub fn read_feature_collection(path: &str) -> BReturnsResult<FeatureCollection> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let gj: GeoJson = contents
        .parse::<GeoJson>()
        .context(ParsingGeoJsonSnafu { path })?;
    match gj {
        GeoJson::FeatureCollection(fc) => {
            debug!(
                "read_feature_collection: {:?}: {} features",
                path,
                fc.features.len()
            );
            Ok(fc)
        }
        _ => NotFeatureCollectionSnafu { path }.fail().map_err(Box::new),
    }
}

/// Sets the `county` property of each feature. Returns the labels set.
pub fn label_counties(collection: &mut FeatureCollection, normalizer: &Normalizer) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for (idx, feature) in collection.features.iter_mut().enumerate() {
        let raw = NAME_PROPERTIES
            .iter()
            .find_map(|p| feature.property(p).and_then(|v| v.as_str()))
            .map(|s| s.to_string());
        match raw {
            Some(name) => {
                let county = normalizer.county(&name);
                debug!("label_counties: {:?} -> {:?}", name, county);
                feature.set_property("county", county.clone());
                labels.push(county);
            }
            None => warn!("label_counties: feature {} has no name, left unlabelled", idx),
        }
    }
    labels
}

pub fn write_feature_collection(path: &str, collection: FeatureCollection) -> BReturnsResult<()> {
    let js = serde_json::to_string(&collection).context(SerializingJsonSnafu {})?;
    fs::write(path, js).context(WritingFileSnafu { path })?;
    debug!("write_feature_collection: {}", simplify_file_name(path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn labels() {
        let gj: GeoJson = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": null, "properties": {"NAME20": "MCKEAN"}},
            {"type": "Feature", "geometry": null, "properties": {"GEOID": "42001"}}
        ]}"#
        .parse()
        .unwrap();
        let mut fc = match gj {
            GeoJson::FeatureCollection(fc) => fc,
            _ => panic!("not a collection"),
        };
        let labels = label_counties(&mut fc, &Normalizer::default());
        assert_eq!(labels, vec!["McKean".to_string()]);
        assert_eq!(
            fc.features[0].property("county").and_then(|v| v.as_str()),
            Some("McKean")
        );
        assert!(fc.features[1].property("county").is_none());
    }

    #[test]
    fn not_a_collection() {
        let p = env::temp_dir().join(format!("countyret-point-{}.geojson", std::process::id()));
        fs::write(&p, r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#).unwrap();
        let res = read_feature_collection(&p.display().to_string());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(ReturnsError::NotFeatureCollection { .. })
        ));
    }
}
