//! Serialisable source data for a navigation mesh

use std::collections::HashSet;
use std::path::Path;

use navmesh_common::{Error, Result};
use serde::{Deserialize, Serialize};

fn default_scale() -> f32 {
    1.0
}

fn default_cost_factor() -> f32 {
    1.0
}

/// One convex polygon of the source data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSource {
    pub id: u32,
    /// Vertices as `[x, y, z]`, either winding
    pub vertices: Vec<[f32; 3]>,
    #[serde(default = "default_cost_factor")]
    pub cost_factor: f32,
}

impl PolygonSource {
    pub fn new(id: u32, vertices: Vec<[f32; 3]>) -> Self {
        Self {
            id,
            vertices,
            cost_factor: 1.0,
        }
    }
}

/// Navigation mesh as loaded from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonData {
    #[serde(default)]
    pub map_id: u32,
    /// Map extent along X
    #[serde(default)]
    pub width: f32,
    /// Map extent along Z
    #[serde(default)]
    pub height: f32,
    /// Whether polygons may be stacked at different heights
    #[serde(default)]
    pub three_dimensional: bool,
    /// Multiplier applied to every vertex at load
    #[serde(default = "default_scale")]
    pub scale: f32,
    pub polygons: Vec<PolygonSource>,
}

impl PolygonData {
    pub fn new(map_id: u32, polygons: Vec<PolygonSource>) -> Self {
        Self {
            map_id,
            width: 0.0,
            height: 0.0,
            three_dimensional: false,
            scale: 1.0,
            polygons,
        }
    }

    /// Parses mesh data from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Loads mesh data from a JSON file
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the parts of the data that do not need geometry.
    ///
    /// Area and convexity are checked when the graph is built, after scaling.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::InvalidMesh(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }

        if self.polygons.is_empty() {
            return Err(Error::InvalidMesh(format!(
                "map {} has no polygons",
                self.map_id
            )));
        }

        let mut ids = HashSet::with_capacity(self.polygons.len());
        for polygon in &self.polygons {
            if !ids.insert(polygon.id) {
                return Err(Error::InvalidMesh(format!(
                    "duplicate polygon id {}",
                    polygon.id
                )));
            }

            if polygon.vertices.len() < 3 {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} has {} vertices, at least 3 are required",
                    polygon.id,
                    polygon.vertices.len()
                )));
            }

            if polygon.vertices.iter().flatten().any(|c| !c.is_finite()) {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} has a non-finite coordinate",
                    polygon.id
                )));
            }

            if !(polygon.cost_factor.is_finite() && polygon.cost_factor > 0.0) {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} has cost factor {}, it must be positive",
                    polygon.id, polygon.cost_factor
                )));
            }
        }

        Ok(())
    }
}
