//! Per-map model manager: a non-owning registration set plus presentation
//! and mask forwarding.
//!
//! The manager never owns a model's lifecycle; it tracks membership, places
//! resolved assets into the render scene, and keeps the mask layer in sync by
//! subscribing to each registered model's mask changes.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};

use crate::asset::DebugOverrides;
use crate::events::{EventKind, ModelEvent, SubscriptionId};
use crate::host::{MaskLayer, RenderScene};
use crate::ids::{MapId, ModelId};
use crate::model::Model;

/// Construction options, mirroring the host-side configuration surface.
/// `map` is required; the collaborators are optional capabilities.
#[derive(Default)]
pub struct ManagerOptions {
    pub map: Option<MapId>,
    pub mask_layer: Option<Rc<RefCell<dyn MaskLayer>>>,
    pub scene: Option<Box<dyn RenderScene>>,
    pub overrides: DebugOverrides,
}

impl ManagerOptions {
    pub fn for_map(map: MapId) -> Self {
        Self {
            map: Some(map),
            ..Default::default()
        }
    }
}

pub struct ModelManager {
    map: MapId,
    models: HashSet<ModelId>,
    mask_subscriptions: HashMap<ModelId, SubscriptionId>,
    mask_layer: Option<Rc<RefCell<dyn MaskLayer>>>,
    scene: Option<Box<dyn RenderScene>>,
    overrides: DebugOverrides,
}

impl ModelManager {
    /// Panics when `options.map` is absent: a manager without a host map is a
    /// setup error, not a runtime condition.
    pub fn new(options: ManagerOptions) -> Self {
        let map = match options.map {
            Some(map) => map,
            None => panic!("ModelManager requires a map"),
        };
        Self {
            map,
            models: HashSet::new(),
            mask_subscriptions: HashMap::new(),
            mask_layer: options.mask_layer,
            scene: options.scene,
            overrides: options.overrides,
        }
    }

    pub fn map(&self) -> MapId {
        self.map
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.models.contains(id)
    }

    /// Register a model. Duplicate registration warns and leaves everything
    /// as it was.
    pub fn add_model(&mut self, model: &mut Model) {
        let id = model.id().clone();
        if self.models.contains(&id) {
            log::warn!(target: "mapscene", "model {id} is already registered");
            return;
        }
        self.models.insert(id.clone());

        if model.is_loaded() {
            self.present(model);
        }

        if let Some(layer) = &self.mask_layer {
            layer.borrow_mut().add(vec![model.mask_geometry()]);
            let forward = Rc::clone(layer);
            let sub = model.on(EventKind::MaskChanged, move |event| {
                if let ModelEvent::MaskChanged { geometry, .. } = event {
                    forward.borrow_mut().update(geometry.clone());
                }
            });
            self.mask_subscriptions.insert(id, sub);
        }
    }

    /// Place a registered model's resolved asset into the render scene,
    /// applying the configured overrides. No-op for unregistered or unloaded
    /// models.
    pub fn present(&mut self, model: &mut Model) {
        if !self.models.contains(model.id()) {
            return;
        }
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let id = model.id().clone();
        if let Some(object) = model.object_mut() {
            object.apply_overrides(&self.overrides);
            scene.insert(&id, object);
        }
    }

    /// Host zoom hook. Non-zoomable models receive a transient render scale
    /// so their on-screen size holds as the camera zooms; zoomable models are
    /// left to the camera transform. The persisted scale never changes.
    pub fn rescale_for_zoom(&self, model: &mut Model, factor: f64) {
        if !model.is_zoomable() {
            let [x, y, z] = model.scale();
            model.set_model_scale(vec![x * factor, y * factor, z * factor]);
        }
    }

    /// Deregister a model: drop its mask forwarding, its mask geometry, and
    /// its scene presence. Idempotent.
    pub fn remove_model(&mut self, model: &mut Model) {
        let id = model.id().clone();
        if !self.models.remove(&id) {
            return;
        }
        if let Some(sub) = self.mask_subscriptions.remove(&id) {
            model.off(sub);
        }
        if let Some(layer) = &self.mask_layer {
            layer.borrow_mut().remove(&id);
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// it should fail fast when constructed without a map
    #[test]
    #[should_panic(expected = "ModelManager requires a map")]
    fn missing_map_is_fatal() {
        let _ = ModelManager::new(ManagerOptions::default());
    }

    #[test]
    fn empty_manager_basics() {
        let mgr = ModelManager::new(ManagerOptions::for_map(MapId::generate()));
        assert!(mgr.is_empty());
        assert_eq!(mgr.len(), 0);
    }
}
