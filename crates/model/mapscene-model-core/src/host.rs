//! Host-side contracts: the map, its mask layer, and the render scene.
//!
//! `MapBinding` is the shared handle a model keeps while attached. It owns
//! the host trait object and lazily creates the per-map model manager; the
//! single-threaded cooperative model makes `Rc<RefCell<…>>` the ownership
//! story (models and the application share one binding per map).

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use mapscene_api_core::{CameraState, LatLng, WorldPoint};

use crate::asset::SceneObject;
use crate::ids::{MapId, ModelId};
use crate::manager::{ManagerOptions, ModelManager};

/// The map's capabilities the core depends on.
pub trait MapHost {
    /// Project a geographic coordinate onto the world plane at `zoom`.
    fn project_to_world_plane(&self, coordinate: LatLng, zoom: f64) -> WorldPoint;
    fn center(&self) -> LatLng;
    fn camera(&self) -> CameraState;
    /// Request (or release) sustained every-frame redraw.
    fn keep_high_fps(&mut self, keep: bool);
}

/// A model's ground-projected outline, keyed for mask-layer updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskGeometry {
    pub id: ModelId,
    pub paths: Vec<LatLng>,
}

/// Cuts the underlying 2D basemap beneath model footprints.
pub trait MaskLayer {
    fn add(&mut self, geometries: Vec<MaskGeometry>);
    fn update(&mut self, geometry: MaskGeometry);
    fn remove(&mut self, id: &ModelId);
}

/// Presentation seam: where a manager places resolved assets.
pub trait RenderScene {
    fn insert(&mut self, id: &ModelId, object: &SceneObject);
    fn remove(&mut self, id: &ModelId);
}

/// Shared per-map state: the host and the lazily-created model manager.
pub struct MapBinding {
    id: MapId,
    host: Box<dyn MapHost>,
    manager: Option<ModelManager>,
}

pub type MapRef = Rc<RefCell<MapBinding>>;

impl MapBinding {
    pub fn new(host: Box<dyn MapHost>) -> MapRef {
        Rc::new(RefCell::new(Self {
            id: MapId::generate(),
            host,
            manager: None,
        }))
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn host(&self) -> &dyn MapHost {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn MapHost {
        self.host.as_mut()
    }

    /// Install a configured manager (mask layer, scene, overrides). Replaces
    /// a previously created bare manager.
    pub fn set_manager(&mut self, manager: ModelManager) {
        self.manager = Some(manager);
    }

    /// The manager for this map, creating a bare one on first use.
    pub fn ensure_manager(&mut self) -> &mut ModelManager {
        let id = self.id;
        self.manager
            .get_or_insert_with(|| ModelManager::new(ManagerOptions::for_map(id)))
    }

    pub fn manager(&self) -> Option<&ModelManager> {
        self.manager.as_ref()
    }

    pub fn manager_mut(&mut self) -> Option<&mut ModelManager> {
        self.manager.as_mut()
    }
}
