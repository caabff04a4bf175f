// GeoJSON boundary I/O
//
// File reading and writing happens only here, at the pipeline boundary:
// points and areas are loaded before the run, results are written after it.
// Geometry support is deliberately narrow: point features for the two point
// sets, polygon features for the areas. Anything else is a data error.

use crate::area::Area;
use crate::engine::RunResult;
use crate::error::{Result, SpptError};
use geo::{LineString, Point, Polygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::json;
use std::fs;
use std::path::Path;

// ============================================================================
// LOADING
// ============================================================================

/// Load an ordered point set from a GeoJSON file of Point features.
pub fn load_points(path: &Path) -> Result<Vec<Point<f64>>> {
    points_from_geojson(&fs::read_to_string(path)?)
}

/// Load areas (polygon + attribute record) from a GeoJSON file.
pub fn load_areas(path: &Path) -> Result<Vec<Area>> {
    areas_from_geojson(&fs::read_to_string(path)?)
}

/// Parse a GeoJSON FeatureCollection of Point features.
pub fn points_from_geojson(contents: &str) -> Result<Vec<Point<f64>>> {
    feature_collection(contents.parse()?)?
        .features
        .into_iter()
        .map(|feature| match feature_geometry(feature)?.value {
            Value::Point(position) => point_from_position(&position),
            other => Err(SpptError::data(format!(
                "expected Point geometry, found {}",
                geometry_type_name(&other)
            ))),
        })
        .collect()
}

/// Parse a GeoJSON FeatureCollection of Polygon features into areas.
/// Feature properties become the area's attribute record and pass through
/// unchanged to the output.
pub fn areas_from_geojson(contents: &str) -> Result<Vec<Area>> {
    feature_collection(contents.parse()?)?
        .features
        .into_iter()
        .map(|mut feature| {
            let attributes = feature.properties.take().unwrap_or_default();
            let polygon = match feature_geometry(feature)?.value {
                Value::Polygon(rings) => polygon_from_rings(rings)?,
                other => {
                    return Err(SpptError::data(format!(
                        "expected Polygon geometry for an area, found {}",
                        geometry_type_name(&other)
                    )))
                }
            };
            Ok(Area::with_attributes(polygon, attributes))
        })
        .collect()
}

fn feature_collection(geojson: GeoJson) -> Result<FeatureCollection> {
    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(SpptError::data(
            "input must be a GeoJSON FeatureCollection",
        )),
    }
}

fn feature_geometry(feature: Feature) -> Result<Geometry> {
    feature
        .geometry
        .ok_or_else(|| SpptError::data("feature has no geometry"))
}

fn point_from_position(position: &[f64]) -> Result<Point<f64>> {
    if position.len() < 2 {
        return Err(SpptError::data("point position needs x and y coordinates"));
    }
    Ok(Point::new(position[0], position[1]))
}

fn polygon_from_rings(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon<f64>> {
    let mut rings = rings.into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| SpptError::data("polygon has no exterior ring"))?;
    Ok(Polygon::new(
        ring_from_positions(exterior)?,
        rings.map(ring_from_positions).collect::<Result<Vec<_>>>()?,
    ))
}

fn ring_from_positions(positions: Vec<Vec<f64>>) -> Result<LineString<f64>> {
    let coords = positions
        .iter()
        .map(|position| point_from_position(position).map(|p| (p.x(), p.y())))
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::from(coords))
}

fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

// ============================================================================
// WRITING
// ============================================================================

/// Write the per-area results (plus the run summary) as a GeoJSON
/// FeatureCollection.
pub fn write_results(path: &Path, result: &RunResult) -> Result<()> {
    let collection = results_to_feature_collection(result)?;
    fs::write(path, serde_json::to_string_pretty(&collection)?)?;
    Ok(())
}

/// Build the output FeatureCollection: one feature per area carrying the
/// source attributes plus the computed statistics, with the run summary as
/// a foreign member.
pub fn results_to_feature_collection(result: &RunResult) -> Result<FeatureCollection> {
    let features = result
        .areas
        .iter()
        .map(|area| {
            let mut properties = area.attributes.clone();
            properties.insert("SIndex".into(), json!(area.local_s));
            properties.insert("NumBasePts".into(), json!(area.num_base_points));
            properties.insert("NumTestPts".into(), json!(area.abs_num_test_points));
            properties.insert("PctBasePts".into(), json!(area.percentage_base_points));
            properties.insert("PctTestPts".into(), json!(area.abs_percentage_test_points));
            let (lo, hi) = area
                .band()
                .ok_or_else(|| SpptError::invariant("area has no confidence band to output"))?;
            properties.insert("ConfIntLowerP".into(), json!(lo));
            properties.insert("ConfIntUpperP".into(), json!(hi));

            Ok(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&area.polygon))),
                id: area.id.map(|n| Id::Number(n.into())),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut foreign_members = serde_json::Map::new();
    foreign_members.insert("summary".into(), serde_json::to_value(&result.summary)?);

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunSummary;

    const POINTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.5, 2.5]}, "properties": {}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-3.0, 0.25]}, "properties": null}
        ]
    }"#;

    const AREAS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[0,10],[10,10],[10,0],[0,0]]]},
                "properties": {"name": "north ward", "population": 1200}
            }
        ]
    }"#;

    #[test]
    fn parses_point_features_in_order() {
        let points = points_from_geojson(POINTS).unwrap();
        assert_eq!(points, vec![Point::new(1.5, 2.5), Point::new(-3.0, 0.25)]);
    }

    #[test]
    fn parses_polygon_features_with_attributes() {
        let areas = areas_from_geojson(AREAS).unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].attributes["name"], json!("north ward"));
        assert_eq!(areas[0].polygon.exterior().0.len(), 5);
    }

    #[test]
    fn rejects_wrong_geometry_types() {
        let err = points_from_geojson(AREAS).unwrap_err();
        assert!(matches!(err, SpptError::Data(_)));

        let err = areas_from_geojson(POINTS).unwrap_err();
        assert!(matches!(err, SpptError::Data(_)));
    }

    #[test]
    fn rejects_non_feature_collections() {
        let err = points_from_geojson(r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, SpptError::Data(_)));
    }

    #[test]
    fn output_carries_attributes_and_statistics() {
        let mut area = areas_from_geojson(AREAS).unwrap().remove(0);
        area.num_base_points = 12;
        area.abs_num_test_points = 9;
        area.percentage_base_points = 60.0;
        area.abs_percentage_test_points = 45.0;
        area.test_percentages = vec![40.0, 50.0, 55.0];
        area.trimmed_percentages = vec![40.0, 50.0, 55.0];
        area.local_s = -1;

        let result = RunResult {
            summary: RunSummary {
                global_s: 0.0,
                seed: 17,
                iterations: 3,
                sample_percentage: 85,
                confidence_interval: 100,
                trim_count: 0,
                total_base_points: 20,
                total_test_points: 20,
                sampled_per_iteration: 17,
                num_areas: 1,
            },
            areas: vec![area],
        };

        let collection = results_to_feature_collection(&result).unwrap();
        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["name"], json!("north ward"));
        assert_eq!(properties["SIndex"], json!(-1));
        assert_eq!(properties["NumBasePts"], json!(12));
        assert_eq!(properties["NumTestPts"], json!(9));
        assert_eq!(properties["PctBasePts"], json!(60.0));
        assert_eq!(properties["ConfIntLowerP"], json!(40.0));
        assert_eq!(properties["ConfIntUpperP"], json!(55.0));

        let summary = &collection.foreign_members.as_ref().unwrap()["summary"];
        assert_eq!(summary["global_s"], json!(0.0));
        assert_eq!(summary["seed"], json!(17));
    }

    #[test]
    fn grid_areas_get_their_synthesized_id_and_boundary() {
        let points = vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)];
        let mut areas = crate::grid::regular_grid(2, &points);
        for area in areas.iter_mut() {
            area.test_percentages = vec![25.0];
            area.trimmed_percentages = vec![25.0];
        }

        let result = RunResult {
            summary: RunSummary {
                global_s: 1.0,
                seed: 1,
                iterations: 1,
                sample_percentage: 100,
                confidence_interval: 100,
                trim_count: 0,
                total_base_points: 2,
                total_test_points: 2,
                sampled_per_iteration: 2,
                num_areas: 4,
            },
            areas,
        };

        let collection = results_to_feature_collection(&result).unwrap();
        assert_eq!(collection.features.len(), 4);
        assert_eq!(
            collection.features[0].id,
            Some(Id::Number(serde_json::Number::from(0u64)))
        );
        assert_eq!(
            collection.features[3].id,
            Some(Id::Number(serde_json::Number::from(3u64)))
        );
        assert!(collection.features[0].geometry.is_some());
    }
}
