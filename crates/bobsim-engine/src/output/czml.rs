//! Renders the `Propagator_Results` samples a `propagator` node attaches
//! (marked via its `_czml_enabled`/`_czml_source_key` payload fields, §4.5)
//! into a CZML document at `czml/<network>/<node>.czml`. File I/O lives here
//! rather than in the behavior so `bobsim-proto` stays free of output
//! formats and paths.

use crate::errors::EngineError;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct CzmlSample {
    pub t_secs: f64,
    pub x_km: f64,
    pub y_km: f64,
    pub z_km: f64,
}

pub fn write_czml(path: &Path, node_name: &str, epoch: DateTime<Utc>, samples: &[CzmlSample]) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| EngineError::Output { path: path.display().to_string(), source: e })?;
    }

    let mut cartesian = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        cartesian.push(s.t_secs);
        cartesian.push(s.x_km * 1000.0);
        cartesian.push(s.y_km * 1000.0);
        cartesian.push(s.z_km * 1000.0);
    }
    let end_iso = samples
        .last()
        .map(|s| (epoch + chrono::Duration::milliseconds((s.t_secs * 1000.0) as i64)).to_rfc3339())
        .unwrap_or_else(|| epoch.to_rfc3339());
    let interval = format!("{}/{}", epoch.to_rfc3339(), end_iso);

    let doc = json!([
        { "id": "document", "name": node_name, "version": "1.0" },
        {
            "id": node_name,
            "name": node_name,
            "availability": interval,
            "billboard": {
                "image": "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNk+A8AAQUBAScY42YAAAAASUVORK5CYII=",
                "scale": 1.5,
                "verticalOrigin": "CENTER",
            },
            "label": {
                "text": node_name,
                "font": "11pt Lucida Console",
                "horizontalOrigin": "LEFT",
                "pixelOffset": { "cartesian2": [12.0, 0.0] },
            },
            "path": {
                "material": { "polylineOutline": { "color": { "rgba": [255, 255, 0, 255] } } },
                "width": 2,
                "leadTime": 0,
                "trailTime": (samples.last().map(|s| s.t_secs).unwrap_or(0.0)),
                "resolution": 5,
            },
            "position": {
                "epoch": epoch.to_rfc3339(),
                "referenceFrame": "INERTIAL",
                "interpolationAlgorithm": "LAGRANGE",
                "interpolationDegree": 5,
                "cartesian": cartesian,
            }
        }
    ]);

    let text = serde_json::to_string_pretty(&doc).map_err(|e| EngineError::Output {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    std::fs::write(path, text).map_err(|e| EngineError::Output { path: path.display().to_string(), source: e })
}
