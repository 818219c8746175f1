//! Loaded navigation meshes keyed by map id

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use navmesh_common::{Error, Result};

use crate::config::NavMeshConfig;
use crate::nav_mesh::NavMesh;

/// Owned collection of navigation meshes, one per map
#[derive(Debug, Default)]
pub struct NavMeshRegistry {
    meshes: HashMap<u32, Arc<NavMesh>>,
}

impl NavMeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.json` mesh in `dir`, stopping at the first failure
    pub fn load_dir<P: AsRef<Path>>(dir: P, config: &NavMeshConfig) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut registry = Self::new();
        for file in files {
            let mesh = NavMesh::load_from_json(&file, config.clone())?;
            let map_id = mesh.map_id();
            if registry.meshes.contains_key(&map_id) {
                return Err(Error::InvalidMesh(format!(
                    "map {} is defined twice, again in {}",
                    map_id,
                    file.display()
                )));
            }
            registry.insert(Arc::new(mesh));
        }

        log::info!(
            "Loaded {} navigation meshes from {}",
            registry.len(),
            dir.display()
        );
        Ok(registry)
    }

    /// Adds a mesh, returning the one it replaces
    pub fn insert(&mut self, mesh: Arc<NavMesh>) -> Option<Arc<NavMesh>> {
        self.meshes.insert(mesh.map_id(), mesh)
    }

    pub fn get(&self, map_id: u32) -> Option<Arc<NavMesh>> {
        self.meshes.get(&map_id).cloned()
    }

    pub fn remove(&mut self, map_id: u32) -> Option<Arc<NavMesh>> {
        self.meshes.remove(&map_id)
    }

    pub fn contains(&self, map_id: u32) -> bool {
        self.meshes.contains_key(&map_id)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Loaded map ids in ascending order
    pub fn map_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.meshes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
