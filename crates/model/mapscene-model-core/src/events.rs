//! Model event surface: structured payloads plus an owned dispatcher.
//!
//! A model composes a dispatcher instead of inheriting an event base class;
//! subscriptions are keyed by event kind and removable individually, per
//! kind, or all at once (the destroy path).

use hashbrown::HashMap;

use mapscene_animation_core::FrameSnapshot;

use crate::host::MaskGeometry;
use crate::ids::ModelId;
use crate::loader::LoadError;

/// Everything a model reports outward. Each payload names its `target` so
/// subscribers shared across models can route.
#[derive(Clone, Debug)]
pub enum ModelEvent {
    Loaded {
        target: ModelId,
    },
    Loading {
        target: ModelId,
        /// Fraction in [0,1] when the total is known, else 0.
        progress: f64,
        loaded: u64,
        total: u64,
    },
    LoadFailed {
        target: ModelId,
        error: LoadError,
    },
    MaskChanged {
        target: ModelId,
        geometry: MaskGeometry,
    },
    Click {
        target: ModelId,
        /// [lat, lng, height] of the picked point when the host resolved one.
        position: Option<[f64; 3]>,
        properties: HashMap<String, serde_json::Value>,
    },
    AnimationPlaying {
        target: ModelId,
        progress: f64,
        frame: FrameSnapshot,
    },
    AnimationLooped {
        target: ModelId,
        iteration: u32,
    },
    AnimationEnded {
        target: ModelId,
    },
    AnimationStopped {
        target: ModelId,
    },
    AnimationPaused {
        target: ModelId,
    },
    AnimationResumed {
        target: ModelId,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    Loaded,
    Loading,
    LoadFailed,
    MaskChanged,
    Click,
    AnimationPlaying,
    AnimationLooped,
    AnimationEnded,
    AnimationStopped,
    AnimationPaused,
    AnimationResumed,
}

impl ModelEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ModelEvent::Loaded { .. } => EventKind::Loaded,
            ModelEvent::Loading { .. } => EventKind::Loading,
            ModelEvent::LoadFailed { .. } => EventKind::LoadFailed,
            ModelEvent::MaskChanged { .. } => EventKind::MaskChanged,
            ModelEvent::Click { .. } => EventKind::Click,
            ModelEvent::AnimationPlaying { .. } => EventKind::AnimationPlaying,
            ModelEvent::AnimationLooped { .. } => EventKind::AnimationLooped,
            ModelEvent::AnimationEnded { .. } => EventKind::AnimationEnded,
            ModelEvent::AnimationStopped { .. } => EventKind::AnimationStopped,
            ModelEvent::AnimationPaused { .. } => EventKind::AnimationPaused,
            ModelEvent::AnimationResumed { .. } => EventKind::AnimationResumed,
        }
    }

    pub fn target(&self) -> &ModelId {
        match self {
            ModelEvent::Loaded { target }
            | ModelEvent::Loading { target, .. }
            | ModelEvent::LoadFailed { target, .. }
            | ModelEvent::MaskChanged { target, .. }
            | ModelEvent::Click { target, .. }
            | ModelEvent::AnimationPlaying { target, .. }
            | ModelEvent::AnimationLooped { target, .. }
            | ModelEvent::AnimationEnded { target }
            | ModelEvent::AnimationStopped { target }
            | ModelEvent::AnimationPaused { target }
            | ModelEvent::AnimationResumed { target } => target,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ModelEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    callback: Callback,
}

/// Single-threaded synchronous dispatcher owned by each model.
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: Vec<Subscription>,
    next: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&ModelEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next = self.next.wrapping_add(1);
        self.subscriptions.push(Subscription {
            id,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove one subscription; returns whether it existed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Remove every subscription for one event kind.
    pub fn off_kind(&mut self, kind: EventKind) {
        self.subscriptions.retain(|s| s.kind != kind);
    }

    /// Remove every subscription.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn emit(&mut self, event: &ModelEvent) {
        let kind = event.kind();
        for s in self.subscriptions.iter_mut() {
            if s.kind == kind {
                (s.callback)(event);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
