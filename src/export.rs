use crate::crs::Crs;
use crate::georef::GeoreferencedTree;
use csv::StringRecord;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io;
use thiserror::Error;

pub const X_COLUMN: &str = "X_UTM";
pub const Y_COLUMN: &str = "Y_UTM";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Input columns carried to the output, with their position in the input row.
///
/// `X_UTM` and `Y_UTM` columns left over from an earlier run are dropped, the
/// recomputed values take their place.
fn carried_columns(headers: &StringRecord) -> impl Iterator<Item = (usize, &str)> {
    headers.iter().enumerate().filter(|(_, name)| {
        let name = name.trim();
        !name.eq_ignore_ascii_case(X_COLUMN) && !name.eq_ignore_ascii_case(Y_COLUMN)
    })
}

/// Field `i` of a tree's input row. Short rows read as empty.
fn field<'a>(tree: &'a GeoreferencedTree<'_>, i: usize) -> &'a str {
    tree.tree.fields.get(i).unwrap_or("")
}

/// Write the input columns plus `X_UTM` and `Y_UTM`, one row per tree.
pub fn write_csv<W: io::Write>(
    writer: W,
    headers: &StringRecord,
    trees: &[GeoreferencedTree<'_>],
    delimiter: u8,
) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    let names = carried_columns(headers).map(|(_, name)| name);
    writer.write_record(names.chain([X_COLUMN, Y_COLUMN]))?;
    for tree in trees {
        let fields = carried_columns(headers).map(|(i, _)| field(tree, i));
        let x = tree.x_utm.to_string();
        let y = tree.y_utm.to_string();
        writer.write_record(fields.chain([x.as_str(), y.as_str()]))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    crs: NamedCrs,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct NamedCrs {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: NamedCrsProperties,
}

#[derive(Serialize)]
struct NamedCrsProperties {
    name: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: PointGeometry,
    properties: Map<String, Value>,
}

#[derive(Serialize)]
struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2],
}

fn feature(headers: &StringRecord, tree: &GeoreferencedTree<'_>) -> Feature {
    let mut properties: Map<String, Value> = carried_columns(headers)
        .map(|(i, name)| (name.to_string(), Value::String(field(tree, i).to_string())))
        .collect();
    properties.insert(X_COLUMN.to_string(), Value::from(tree.x_utm));
    properties.insert(Y_COLUMN.to_string(), Value::from(tree.y_utm));
    Feature {
        kind: "Feature",
        geometry: PointGeometry {
            kind: "Point",
            coordinates: [tree.x_utm, tree.y_utm],
        },
        properties,
    }
}

/// Write the trees as a GeoJSON `FeatureCollection` of points tagged with `crs`.
///
/// The named `crs` member comes from the 2008 GeoJSON format; RFC 7946 readers
/// ignore it, GDAL and QGIS honour it.
pub fn write_geojson<W: io::Write>(
    mut writer: W,
    headers: &StringRecord,
    trees: &[GeoreferencedTree<'_>],
    crs: Crs,
) -> Result<(), ExportError> {
    let collection = FeatureCollection {
        kind: "FeatureCollection",
        crs: NamedCrs {
            kind: "name",
            properties: NamedCrsProperties { name: crs.urn() },
        },
        features: trees.iter().map(|tree| feature(headers, tree)).collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.flush()?;
    Ok(())
}
