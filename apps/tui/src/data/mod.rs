//! Static network data: GeoJSON feature collections and the property
//! accessors styling and popups read from them.

mod geo;
mod geojson;
mod properties;

pub use geo::{haversine_km, line_length_km};
pub use geojson::{
    load_feature_collection, load_feature_collection_blocking, Feature, FeatureCollection,
    Geometry,
};
pub use properties::FeatureProperties;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a FeatureCollection, found {0}")]
    NotAFeatureCollection(String),
}
