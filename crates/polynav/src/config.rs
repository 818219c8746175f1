//! Configuration for navigation mesh construction and queries

use navmesh_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// How the traversal cost of a connection is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// Distance between polygon centers times the cost factor of the target
    #[default]
    CenterDistance,
    /// Fixed cost per crossing times the cost factor of the target
    Uniform { cost: f32 },
}

/// Configuration parameters for a navigation mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavMeshConfig {
    /// Vertices closer than this (3D distance) are welded together
    pub edge_epsilon: f32,
    /// Maximum vertical distance between a query point and the polygon it is
    /// located in. Only used on three-dimensional meshes; `None` accepts the
    /// closest polygon at any height
    pub height_tolerance: Option<f32>,
    /// Connection cost model
    pub cost_model: CostModel,
    /// Maximum number of nodes a single search may expand
    pub max_search_nodes: usize,
    /// Lattice step used to sample the random-point cache
    pub sample_step: f32,
    /// Random points farther than this from the query height are skipped on
    /// three-dimensional meshes
    pub random_point_height_precision: f32,
    /// Maximum polygons per spatial index leaf
    pub bvh_leaf_size: usize,
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        Self {
            edge_epsilon: 1e-3,
            height_tolerance: None,
            cost_model: CostModel::CenterDistance,
            max_search_nodes: 65_536,
            sample_step: 1.0,
            random_point_height_precision: 6.0,
            bvh_leaf_size: 4,
        }
    }
}

impl NavMeshConfig {
    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.edge_epsilon.is_finite() && self.edge_epsilon > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "edge_epsilon must be positive, got {}",
                self.edge_epsilon
            )));
        }

        if let Some(tolerance) = self.height_tolerance {
            if tolerance.is_nan() || tolerance < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "height_tolerance must not be negative, got {}",
                    tolerance
                )));
            }
        }

        if let CostModel::Uniform { cost } = self.cost_model {
            if !(cost.is_finite() && cost >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "uniform cost must be finite and non-negative, got {}",
                    cost
                )));
            }
        }

        if self.max_search_nodes == 0 {
            return Err(Error::InvalidConfig(
                "max_search_nodes must be at least 1".to_string(),
            ));
        }

        if !(self.sample_step.is_finite() && self.sample_step > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "sample_step must be positive, got {}",
                self.sample_step
            )));
        }

        if self.random_point_height_precision.is_nan() || self.random_point_height_precision < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "random_point_height_precision must not be negative, got {}",
                self.random_point_height_precision
            )));
        }

        if self.bvh_leaf_size == 0 {
            return Err(Error::InvalidConfig(
                "bvh_leaf_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Parses a configuration from JSON, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NavMeshConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cost_model, CostModel::CenterDistance);
        assert_eq!(config.height_tolerance, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = NavMeshConfig {
            edge_epsilon: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = NavMeshConfig {
            sample_step: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = NavMeshConfig {
            cost_model: CostModel::Uniform { cost: -1.0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = NavMeshConfig {
            height_tolerance: Some(-0.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config = NavMeshConfig::from_json_str(
            r#"{ "height_tolerance": 2.5, "cost_model": { "uniform": { "cost": 1.0 } } }"#,
        )?;

        assert_eq!(config.height_tolerance, Some(2.5));
        assert_eq!(config.cost_model, CostModel::Uniform { cost: 1.0 });
        assert_eq!(config.max_search_nodes, 65_536);

        let config = NavMeshConfig::from_json_str(r#"{ "cost_model": "center_distance" }"#)?;
        assert_eq!(config.cost_model, CostModel::CenterDistance);
        Ok(())
    }
}
