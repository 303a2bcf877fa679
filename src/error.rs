use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce the country boundary set
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("failed to read geometry file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    #[error("expected a FeatureCollection, found a {0}")]
    NotFeatureCollection(&'static str),
    #[error("geometry loader stopped before delivering a result")]
    Disconnected,
}

/// Failure to read the statistics table
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset JSON: {0}")]
    Parse(#[from] simd_json::Error),
}

/// Failure to write an SVG export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: {0}")]
    NotRendered(&'static str),
    #[error("failed to format SVG")]
    Format(#[from] std::fmt::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
