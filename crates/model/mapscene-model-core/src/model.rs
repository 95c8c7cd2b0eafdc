//! The model: single source of truth for placement and visibility, mediating
//! between geographic coordinates and the asset's local transform.
//!
//! Every setter validates before mutating; malformed input is routed to the
//! warning channel and prior state stands. Setters called before the asset
//! resolves are recorded and re-applied (rotation, scale, position, in that
//! order) once it does, so no write is lost to load latency.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use hashbrown::HashMap;

use mapscene_animation_core::{
    AnimationDriver, AnimationOptions, FrameSnapshot, Keyframe, KeyframeError, PlaybackEvent,
};
use mapscene_api_core::{
    coerce_scale, require_latlng_path, require_vec3, LatLng, TypeError, VecInput, REFERENCE_ZOOM,
};

use crate::asset::SceneObject;
use crate::events::{EventDispatcher, EventKind, ModelEvent, SubscriptionId};
use crate::host::{MapRef, MaskGeometry};
use crate::ids::ModelId;
use crate::loader::{AssetLoader, AssetSource, LoadPoll, LoadState, LoadTask};

fn default_anchor() -> VecInput {
    VecInput::List(vec![0.0, 0.0, 0.0])
}

fn default_rotation() -> VecInput {
    VecInput::List(vec![0.0, 0.0, 0.0])
}

fn default_scale() -> VecInput {
    VecInput::Scalar(1.0)
}

fn default_zoomable() -> bool {
    true
}

/// Construction options. Loose numeric fields run through the same validation
/// as the setters, so a malformed option warns and falls back to the default
/// instead of failing construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelOptions {
    #[serde(default)]
    pub id: Option<String>,
    pub source: AssetSource,
    #[serde(default)]
    pub position: Option<LatLng>,
    #[serde(default)]
    pub mask: Vec<LatLng>,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default = "default_anchor")]
    pub anchor: VecInput,
    #[serde(default = "default_rotation")]
    pub rotation: VecInput,
    #[serde(default = "default_scale")]
    pub scale: VecInput,
    #[serde(default = "default_zoomable")]
    pub zoomable: bool,
}

impl ModelOptions {
    pub fn new(source: AssetSource) -> Self {
        Self {
            id: None,
            source,
            position: None,
            mask: Vec::new(),
            z_index: 0,
            anchor: default_anchor(),
            rotation: default_rotation(),
            scale: default_scale(),
            zoomable: default_zoomable(),
        }
    }
}

enum LoadSlot {
    Idle,
    Pending(Box<dyn LoadTask>),
    Ready,
    Failed,
}

pub struct Model {
    id: ModelId,
    source: AssetSource,
    position: Option<LatLng>,
    /// Local offset subtracted from the projected world position.
    anchor: [f64; 3],
    /// Euler degrees, exactly as set; axis correction happens only on the
    /// derived asset transform.
    rotation: [f64; 3],
    scale: [f64; 3],
    z_index: u32,
    mask: Vec<LatLng>,
    visible: bool,
    zoomable: bool,
    object: Option<SceneObject>,
    load: LoadSlot,
    last_progress: Option<(u64, u64)>,
    map: Option<MapRef>,
    loader: Box<dyn AssetLoader>,
    events: EventDispatcher,
    animation: AnimationDriver,
    destroyed: bool,
}

impl Model {
    /// Build a model and immediately begin its (single) load attempt.
    /// Attachment is a separate step: `model.add_to(&map)`.
    pub fn new(options: ModelOptions, loader: Box<dyn AssetLoader>) -> Self {
        let mut model = Self {
            id: options
                .id
                .map(ModelId::new)
                .unwrap_or_else(ModelId::generate),
            source: options.source,
            position: None,
            anchor: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            z_index: 0,
            mask: Vec::new(),
            visible: true,
            zoomable: options.zoomable,
            object: None,
            load: LoadSlot::Idle,
            last_progress: None,
            map: None,
            loader,
            events: EventDispatcher::new(),
            animation: AnimationDriver::new(),
            destroyed: false,
        };

        model.set_z_index(options.z_index);
        if let Some(position) = options.position {
            model.set_position(position);
        }
        model.set_anchor(options.anchor);
        model.set_mask(options.mask);
        model.set_rotation(options.rotation);
        model.set_scale(options.scale);
        model.show();
        model.load();
        model
    }

    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    pub fn position(&self) -> Option<LatLng> {
        self.position
    }

    pub fn anchor(&self) -> [f64; 3] {
        self.anchor
    }

    pub fn rotation(&self) -> [f64; 3] {
        self.rotation
    }

    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }

    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    pub fn mask(&self) -> &[LatLng] {
        &self.mask
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_zoomable(&self) -> bool {
        self.zoomable
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn object(&self) -> Option<&SceneObject> {
        self.object.as_ref()
    }

    pub(crate) fn object_mut(&mut self) -> Option<&mut SceneObject> {
        self.object.as_mut()
    }

    pub fn load_state(&self) -> LoadState {
        match self.load {
            LoadSlot::Idle => LoadState::Idle,
            LoadSlot::Pending(_) => LoadState::Pending,
            LoadSlot::Ready => LoadState::Ready,
            LoadSlot::Failed => LoadState::Failed,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.object.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_active()
    }

    pub fn animation_progress(&self) -> Option<f64> {
        self.animation.progress()
    }

    /// The model's outline as the mask layer consumes it.
    pub fn mask_geometry(&self) -> MaskGeometry {
        MaskGeometry {
            id: self.id.clone(),
            paths: self.mask.clone(),
        }
    }

    // ----- events -----

    pub fn on(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&ModelEvent) + 'static,
    ) -> SubscriptionId {
        self.events.on(kind, callback)
    }

    pub fn off(&mut self, subscription: SubscriptionId) -> bool {
        self.events.off(subscription)
    }

    pub fn off_kind(&mut self, kind: EventKind) {
        self.events.off_kind(kind)
    }

    // ----- setters -----

    /// Stacking order; negative input clamps to 0.
    pub fn set_z_index(&mut self, z_index: i32) -> &mut Self {
        self.z_index = z_index.max(0) as u32;
        self
    }

    /// Euler degrees [x, y, z]. The stored value round-trips exactly; only
    /// the derived asset transform carries the +90° X correction that
    /// reconciles the EUS model frame with the ENU world frame (an artifact
    /// of how these assets are authored, not a universal convention).
    pub fn set_rotation(&mut self, rotation: impl Into<VecInput>) -> &mut Self {
        match require_vec3("Model.rotation", &rotation.into()) {
            Ok(rotation) => {
                self.rotation = rotation;
                self.apply_rotation();
            }
            Err(err) => err.warn(),
        }
        self
    }

    /// Uniform scalar or [x, y, z]; persisted as a 3-vector.
    pub fn set_scale(&mut self, scale: impl Into<VecInput>) -> &mut Self {
        match coerce_scale("Model.scale", &scale.into()) {
            Ok(scale) => {
                self.scale = scale;
                self.apply_scale(scale);
            }
            Err(err) => err.warn(),
        }
        self
    }

    /// Write a scale to the rendered object without touching the persisted
    /// `scale` attribute. Hosts use this to rescale non-zoomable models as
    /// the zoom level changes.
    pub fn set_model_scale(&mut self, scale: impl Into<VecInput>) -> &mut Self {
        match coerce_scale("Model.scale", &scale.into()) {
            Ok(scale) => self.apply_scale(scale),
            Err(err) => err.warn(),
        }
        self
    }

    /// Geographic position. The derived local translation is only computable
    /// once the asset is loaded and the model attached; until then the value
    /// is remembered.
    pub fn set_position(&mut self, position: LatLng) -> &mut Self {
        if position.is_valid() {
            self.position = Some(position);
            self.apply_position();
        } else {
            TypeError::new("Model.position", "LatLng", format!("{position:?}")).warn();
        }
        self
    }

    /// Local pivot offset; re-derives the translation immediately.
    pub fn set_anchor(&mut self, anchor: impl Into<VecInput>) -> &mut Self {
        match require_vec3("Model.anchor", &anchor.into()) {
            Ok(anchor) => {
                self.anchor = anchor;
                self.apply_position();
            }
            Err(err) => err.warn(),
        }
        self
    }

    /// Ground-projected outline used to cull basemap features underneath.
    pub fn set_mask(&mut self, mask: Vec<LatLng>) -> &mut Self {
        match require_latlng_path("Model.mask", &mask) {
            Ok(()) => {
                self.mask = mask;
                let event = ModelEvent::MaskChanged {
                    target: self.id.clone(),
                    geometry: self.mask_geometry(),
                };
                self.events.emit(&event);
            }
            Err(err) => err.warn(),
        }
        self
    }

    pub fn show(&mut self) -> &mut Self {
        if let Some(object) = self.object.as_mut() {
            object.visible = true;
        }
        self.visible = true;
        self
    }

    pub fn hide(&mut self) -> &mut Self {
        if let Some(object) = self.object.as_mut() {
            object.visible = false;
        }
        self.visible = false;
        self
    }

    // ----- write-through to the asset -----

    fn apply_rotation(&mut self) {
        if let Some(object) = self.object.as_mut() {
            let [x, y, z] = self.rotation;
            let euler = [(x + 90.0).to_radians(), y.to_radians(), z.to_radians()];
            object.set_rotation(euler);
            object.update_matrix();
        }
    }

    fn apply_scale(&mut self, scale: [f64; 3]) {
        if let Some(object) = self.object.as_mut() {
            object.set_scale(scale);
            object.update_matrix();
        }
    }

    fn apply_position(&mut self) {
        let Some(position) = self.position else {
            return;
        };
        let Some(map) = self.map.as_ref() else {
            return;
        };
        let Some(object) = self.object.as_mut() else {
            return;
        };
        let world = map
            .borrow()
            .host()
            .project_to_world_plane(position, REFERENCE_ZOOM);
        // The map plane's y axis grows southward; the world frame's northward.
        let translate = [
            world.x - self.anchor[0],
            -world.y - self.anchor[1],
            0.0 - self.anchor[2],
        ];
        object.set_position(translate);
        object.update_matrix();
    }

    // ----- attach / detach -----

    /// Attach to a map, detaching from any other map first. Attaching to the
    /// current map is a no-op.
    pub fn add_to(&mut self, map: &MapRef) -> &mut Self {
        if self.destroyed {
            return self;
        }
        if let Some(current) = &self.map {
            if Rc::ptr_eq(current, map) {
                return self;
            }
        }
        self.remove();
        map.borrow_mut().ensure_manager().add_model(self);
        self.map = Some(Rc::clone(map));
        self.apply_position();
        self
    }

    /// Detach from the current map, if any. Idempotent.
    pub fn remove(&mut self) -> &mut Self {
        if let Some(map) = self.map.take() {
            let mut binding = map.borrow_mut();
            if let Some(manager) = binding.manager_mut() {
                manager.remove_model(self);
            }
        }
        self
    }

    /// Detach, release every descendant mesh's geometry and material, clear
    /// the asset and all subscriptions. The model is terminal afterwards.
    pub fn destroy(&mut self) -> &mut Self {
        if self.destroyed {
            return self;
        }
        if let Some(event) = self.animation.stop() {
            self.dispatch_playback(event);
        }
        self.remove();
        if let Some(mut object) = self.object.take() {
            object.traverse_mut(&mut |node| node.dispose_mesh());
        }
        self.events.clear();
        self.destroyed = true;
        self
    }

    // ----- load lifecycle -----

    /// Begin the single load attempt. Subsequent calls observe the same
    /// attempt: nothing restarts, nothing re-fetches.
    pub fn load(&mut self) -> &mut Self {
        if self.destroyed {
            return self;
        }
        if matches!(self.load, LoadSlot::Idle) {
            let task = self.loader.begin(&self.source);
            self.load = LoadSlot::Pending(task);
        }
        self
    }

    /// Drive the in-flight load on the host's frame tick. Emits `Loading`
    /// when the reported counters change, and exactly one terminal `Loaded`
    /// or `LoadFailed`.
    pub fn poll_load(&mut self) -> &mut Self {
        if self.destroyed {
            return self;
        }
        let LoadSlot::Pending(task) = &mut self.load else {
            return self;
        };
        let poll = task.poll();
        match poll {
            LoadPoll::Pending { loaded, total } => {
                if self.last_progress != Some((loaded, total)) {
                    self.last_progress = Some((loaded, total));
                    let progress = if total > 0 {
                        loaded as f64 / total as f64
                    } else {
                        0.0
                    };
                    let event = ModelEvent::Loading {
                        target: self.id.clone(),
                        progress,
                        loaded,
                        total,
                    };
                    self.events.emit(&event);
                }
            }
            LoadPoll::Ready(mut object) => {
                object.visible = self.visible;
                self.object = Some(object);
                self.load = LoadSlot::Ready;
                self.apply_rotation();
                self.apply_scale(self.scale);
                self.apply_position();
                let event = ModelEvent::Loaded {
                    target: self.id.clone(),
                };
                self.events.emit(&event);
                if let Some(map) = self.map.clone() {
                    let mut binding = map.borrow_mut();
                    if let Some(manager) = binding.manager_mut() {
                        manager.present(self);
                    }
                }
            }
            LoadPoll::Failed(error) => {
                self.load = LoadSlot::Failed;
                let event = ModelEvent::LoadFailed {
                    target: self.id.clone(),
                    error,
                };
                self.events.emit(&event);
            }
        }
        self
    }

    // ----- picking -----

    /// Surface a pick on this model as a structured event; any further wiring
    /// belongs to the application.
    pub fn dispatch_click(
        &mut self,
        position: Option<[f64; 3]>,
        properties: HashMap<String, serde_json::Value>,
    ) -> &mut Self {
        let event = ModelEvent::Click {
            target: self.id.clone(),
            position,
            properties,
        };
        self.events.emit(&event);
        self
    }

    // ----- animation -----

    /// Start a keyframe session from the model's current position, scale,
    /// and rotation. An active session is fully stopped (and its stop
    /// notified) before the new one produces a frame.
    pub fn start_animation(
        &mut self,
        key_frames: Vec<Keyframe>,
        options: &AnimationOptions,
    ) -> Result<&mut Self, KeyframeError> {
        if self.destroyed {
            return Ok(self);
        }
        let start = FrameSnapshot {
            position: self.position,
            rotation: Some(self.rotation),
            scale: Some(self.scale),
            anchor: None,
        };
        let events = self.animation.start(key_frames, options, start)?;
        for event in events {
            self.dispatch_playback(event);
        }
        self.keep_high_fps(true);
        Ok(self)
    }

    /// Advance the active session on the host's frame tick.
    pub fn tick_animation(&mut self, dt: f64) -> &mut Self {
        if self.destroyed {
            return self;
        }
        for event in self.animation.tick(dt) {
            self.dispatch_playback(event);
        }
        self
    }

    pub fn stop_animation(&mut self) -> &mut Self {
        if let Some(event) = self.animation.stop() {
            self.dispatch_playback(event);
        }
        self
    }

    pub fn pause_animation(&mut self) -> &mut Self {
        if let Some(event) = self.animation.pause() {
            self.dispatch_playback(event);
        }
        self
    }

    pub fn resume_animation(&mut self) -> &mut Self {
        if let Some(event) = self.animation.resume() {
            self.dispatch_playback(event);
        }
        self
    }

    /// Route one playback event: frames fan out to the setters, lifecycle
    /// events toggle sustained redraw and notify subscribers.
    fn dispatch_playback(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Frame {
                progress, frame, ..
            } => {
                if let Some(position) = frame.position {
                    self.set_position(position);
                }
                if let Some(rotation) = frame.rotation {
                    self.set_rotation(rotation);
                }
                if let Some(scale) = frame.scale {
                    self.set_scale(scale);
                }
                if let Some(anchor) = frame.anchor {
                    self.set_anchor(anchor);
                }
                let event = ModelEvent::AnimationPlaying {
                    target: self.id.clone(),
                    progress,
                    frame,
                };
                self.events.emit(&event);
            }
            PlaybackEvent::Looped { iteration, .. } => {
                self.keep_high_fps(true);
                let event = ModelEvent::AnimationLooped {
                    target: self.id.clone(),
                    iteration,
                };
                self.events.emit(&event);
            }
            PlaybackEvent::Ended { .. } => {
                self.keep_high_fps(false);
                let event = ModelEvent::AnimationEnded {
                    target: self.id.clone(),
                };
                self.events.emit(&event);
            }
            PlaybackEvent::Stopped { .. } => {
                self.keep_high_fps(false);
                let event = ModelEvent::AnimationStopped {
                    target: self.id.clone(),
                };
                self.events.emit(&event);
            }
            PlaybackEvent::Paused { .. } => {
                self.keep_high_fps(false);
                let event = ModelEvent::AnimationPaused {
                    target: self.id.clone(),
                };
                self.events.emit(&event);
            }
            PlaybackEvent::Resumed { .. } => {
                self.keep_high_fps(true);
                let event = ModelEvent::AnimationResumed {
                    target: self.id.clone(),
                };
                self.events.emit(&event);
            }
        }
    }

    fn keep_high_fps(&mut self, keep: bool) {
        if let Some(map) = &self.map {
            map.borrow_mut().host_mut().keep_high_fps(keep);
        }
    }
}
