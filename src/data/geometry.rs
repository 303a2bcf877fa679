use crate::config::EXCLUDED_FEATURE;
use crate::error::GeometryError;
use geojson::{GeoJson, Geometry, JsonObject, Value};
use glam::DVec2;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// A closed ring of (lon, lat) positions
pub type Ring = Vec<DVec2>;
/// Exterior ring followed by holes
pub type Polygon = Vec<Ring>;

/// One country: boundary polygons plus the properties the map needs
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    /// ISO alpha-3 code (`ISO_A3`)
    pub iso_a3: String,
    /// Display name (`ADMIN`)
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl GeoFeature {
    pub fn new(iso_a3: impl Into<String>, name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        Self {
            iso_a3: iso_a3.into(),
            name: name.into(),
            polygons,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.polygons.iter().flatten().flatten().copied()
    }
}

/// Post-exclusion feature set, shared read-only with every render pass
#[derive(Debug, Clone, Default)]
pub struct GeometryCache {
    features: Arc<[GeoFeature]>,
}

impl GeometryCache {
    /// Apply the exclusion rule once and freeze the result.
    pub fn from_features(features: Vec<GeoFeature>) -> Self {
        let before = features.len();
        let kept: Vec<GeoFeature> = features
            .into_iter()
            .filter(|f| f.name != EXCLUDED_FEATURE)
            .collect();
        if kept.len() != before {
            debug!(removed = before - kept.len(), "excluded {} from geometry", EXCLUDED_FEATURE);
        }
        Self {
            features: kept.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn features(&self) -> &[GeoFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Parse a GeoJSON FeatureCollection of countries
pub fn parse_countries(text: &str) -> Result<Vec<GeoFeature>, GeometryError> {
    let geojson: GeoJson = text.parse()?;
    let fc = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => return Err(GeometryError::NotFeatureCollection("Feature")),
        GeoJson::Geometry(_) => return Err(GeometryError::NotFeatureCollection("Geometry")),
    };

    let features = fc
        .features
        .into_iter()
        .map(|feature| {
            let props = feature.properties.as_ref();
            let mut polygons = Vec::new();
            if let Some(ref geometry) = feature.geometry {
                collect_polygons(geometry, &mut polygons);
            }
            GeoFeature {
                iso_a3: string_prop(props, "ISO_A3"),
                name: string_prop(props, "ADMIN"),
                polygons,
            }
        })
        .collect();
    Ok(features)
}

fn string_prop(props: Option<&JsonObject>, key: &str) -> String {
    props
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| DVec2::new(c[0], c[1]))
        .collect()
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => out.push(rings.iter().map(|r| ring(r)).collect()),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(rings.iter().map(|r| ring(r)).collect());
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        // Points and lines have no area to fill
        _ => {}
    }
}

pub fn load_countries(path: &Path) -> Result<Vec<GeoFeature>, GeometryError> {
    let content = fs::read_to_string(path).map_err(|source| GeometryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_countries(&content)
}

/// Handle to the one-time background geometry load.
///
/// Resolves exactly once. Dropping the handle before it resolves discards
/// the loader's result.
pub struct GeometryLoad {
    rx: Option<Receiver<Result<Vec<GeoFeature>, GeometryError>>>,
}

impl GeometryLoad {
    /// Non-blocking check for the load result
    pub fn poll(&mut self) -> Option<Result<Vec<GeoFeature>, GeometryError>> {
        let rx = self.rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(GeometryError::Disconnected),
        };
        self.rx = None;
        Some(result)
    }

    pub fn is_resolved(&self) -> bool {
        self.rx.is_none()
    }
}

/// Start loading `path` on a background thread
pub fn spawn_load(path: PathBuf) -> GeometryLoad {
    let (load, _worker) = spawn_with(move || {
        let result = load_countries(&path);
        match &result {
            Ok(features) => info!(count = features.len(), path = %path.display(), "loaded geometry"),
            Err(e) => warn!("geometry load failed: {}", e),
        }
        result
    });
    load
}

/// Run `load` on its own thread. The worker yields whether its result
/// reached a live handle.
fn spawn_with<F>(load: F) -> (GeometryLoad, JoinHandle<bool>)
where
    F: FnOnce() -> Result<Vec<GeoFeature>, GeometryError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let delivered = tx.send(load()).is_ok();
        if !delivered {
            debug!("geometry load finished after teardown; result discarded");
        }
        delivered
    });
    (GeometryLoad { rx: Some(rx) }, worker)
}

#[cfg(test)]
pub(crate) fn square(iso: &str, name: &str, lon: f64, lat: f64, size: f64) -> GeoFeature {
    GeoFeature::new(
        iso,
        name,
        vec![vec![vec![
            DVec2::new(lon, lat),
            DVec2::new(lon + size, lat),
            DVec2::new(lon + size, lat + size),
            DVec2::new(lon, lat + size),
            DVec2::new(lon, lat),
        ]]],
    )
}
