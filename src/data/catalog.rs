use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::data::DataError;
use crate::projection::camera::WorldBounds;
use crate::spatial::kd_tree::KDTree;
use crate::{SystemId, WorldPoint};

/// The backdrop catalog as stored on disk: parallel arrays, positions as flat
/// `x, y, z` triplets.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GalaxyData {
    pub count: usize,
    pub ids: Vec<SystemId>,
    pub positions: Vec<f64>,
    pub names: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StarSystem {
    pub id: SystemId,
    pub name: String,
    pub position: WorldPoint,
}

/// Every known system, indexed by id, by name and by position on the plane.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GalaxyCatalog {
    systems: Vec<StarSystem>,
    #[serde(skip)]
    id_index: HashMap<SystemId, usize>,
    /// Lowercased names.
    #[serde(skip)]
    name_index: HashMap<String, usize>,
    /// Built over positions flattened onto `y = 0`, matching where clicks land.
    #[serde(skip)]
    plane_tree: KDTree,
}

impl GalaxyCatalog {
    pub fn new(systems: Vec<StarSystem>) -> Self {
        let mut catalog = GalaxyCatalog {
            systems,
            ..GalaxyCatalog::default()
        };
        catalog.rebuild_indices();
        catalog
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DataError> {
        let data: GalaxyData = serde_json::from_slice(bytes)?;
        Self::from_data(data)
    }

    /// Checks that the parallel arrays agree with `count`.
    pub fn from_data(data: GalaxyData) -> Result<Self, DataError> {
        let GalaxyData {
            count,
            ids,
            positions,
            names,
        } = data;
        let coordinates = count.checked_mul(3);
        if ids.len() != count || names.len() != count || coordinates != Some(positions.len()) {
            return Err(DataError::Inconsistent(format!(
                "count {} but {} ids, {} names, {} coordinates",
                count,
                ids.len(),
                names.len(),
                positions.len()
            )));
        }
        let systems = ids
            .into_iter()
            .zip(names)
            .zip(positions.chunks_exact(3))
            .map(|((id, name), xyz)| StarSystem {
                id,
                name,
                position: WorldPoint::new(xyz[0], xyz[1], xyz[2]),
            })
            .collect();
        let catalog = GalaxyCatalog::new(systems);
        info!("loaded galaxy catalog with {} systems", catalog.len());
        Ok(catalog)
    }

    pub fn to_data(&self) -> GalaxyData {
        GalaxyData {
            count: self.systems.len(),
            ids: self.systems.iter().map(|s| s.id).collect(),
            positions: self
                .systems
                .iter()
                .flat_map(|s| [s.position.x, s.position.y, s.position.z])
                .collect(),
            names: self.systems.iter().map(|s| s.name.clone()).collect(),
        }
    }

    pub fn rebuild_indices(&mut self) {
        self.id_index = self
            .systems
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.id, idx))
            .collect();
        self.name_index = self
            .systems
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.name.to_lowercase(), idx))
            .collect();
        let flat: Vec<WorldPoint> = self
            .systems
            .iter()
            .map(|s| WorldPoint::new(s.position.x, 0.0, s.position.z))
            .collect();
        self.plane_tree = KDTree::build(&flat);
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    pub fn by_id(&self, id: SystemId) -> Option<&StarSystem> {
        self.id_index.get(&id).map(|&idx| &self.systems[idx])
    }

    /// Case-insensitive name lookup.
    pub fn by_name(&self, name: &str) -> Option<&StarSystem> {
        self.name_index
            .get(&name.to_lowercase())
            .map(|&idx| &self.systems[idx])
    }

    /// System closest to `point` on the galactic plane, if one lies within
    /// `radius`.
    pub fn nearest_on_plane(&self, point: WorldPoint, radius: f64) -> Option<&StarSystem> {
        let flat = WorldPoint::new(point.x, 0.0, point.z);
        self.plane_tree
            .nearest(flat)
            .filter(|&(_, d)| d <= radius)
            .map(|(idx, _)| &self.systems[idx])
    }

    pub fn bounds(&self) -> Option<WorldBounds> {
        WorldBounds::from_points(self.systems.iter().map(|s| s.position))
    }
}
