//! Asset construction contracts.
//!
//! A model names its asset with a tagged [`AssetSource`]; how the bytes are
//! fetched and parsed belongs to the host's [`AssetLoader`]. `begin` returns
//! a task the host polls on its frame tick; a task resolves exactly once, to
//! a [`SceneObject`] or a [`LoadError`], and is not polled again after a
//! terminal poll.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{BoxSpec, SceneObject};

/// What to build. Gltf/Fbx fetch and parse external documents; Mesh resolves
/// synchronously from a procedural description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Gltf { url: String },
    Fbx { url: String },
    Mesh(BoxSpec),
}

impl AssetSource {
    pub fn url(&self) -> Option<&str> {
        match self {
            AssetSource::Gltf { url } | AssetSource::Fbx { url } => Some(url),
            AssetSource::Mesh(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum LoadError {
    #[error("fetch failed for {url}: {detail}")]
    Fetch { url: String, detail: String },
    #[error("parse failed: {detail}")]
    Parse { detail: String },
}

/// Where a model stands with its single load attempt.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LoadState {
    Idle,
    Pending,
    Ready,
    Failed,
}

/// One poll of an in-flight load.
#[derive(Debug)]
pub enum LoadPoll {
    Pending { loaded: u64, total: u64 },
    Ready(SceneObject),
    Failed(LoadError),
}

pub trait LoadTask {
    fn poll(&mut self) -> LoadPoll;
}

pub trait AssetLoader {
    fn begin(&mut self, source: &AssetSource) -> Box<dyn LoadTask>;
}

/// Built-in loader for procedural sources. Document-backed sources fail: this
/// loader has no fetch or parse capability.
#[derive(Debug, Default)]
pub struct PrimitiveLoader;

impl AssetLoader for PrimitiveLoader {
    fn begin(&mut self, source: &AssetSource) -> Box<dyn LoadTask> {
        let outcome = match source {
            AssetSource::Mesh(spec) => Ok(SceneObject::box_mesh(spec)),
            other => Err(LoadError::Parse {
                detail: format!("PrimitiveLoader cannot build {other:?}"),
            }),
        };
        Box::new(ImmediateTask {
            outcome: Some(outcome),
        })
    }
}

struct ImmediateTask {
    outcome: Option<Result<SceneObject, LoadError>>,
}

impl LoadTask for ImmediateTask {
    fn poll(&mut self) -> LoadPoll {
        match self.outcome.take() {
            Some(Ok(object)) => LoadPoll::Ready(object),
            Some(Err(err)) => LoadPoll::Failed(err),
            // Already resolved; callers stop polling at the terminal result.
            None => LoadPoll::Pending { loaded: 0, total: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NodeKind;

    #[test]
    fn primitive_loader_resolves_mesh_synchronously() {
        let mut loader = PrimitiveLoader;
        let mut task = loader.begin(&AssetSource::Mesh(BoxSpec::default()));
        match task.poll() {
            LoadPoll::Ready(object) => {
                assert!(matches!(object.kind(), NodeKind::Mesh { .. }))
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn primitive_loader_rejects_documents() {
        let mut loader = PrimitiveLoader;
        let mut task = loader.begin(&AssetSource::Gltf {
            url: "https://assets.example/truck.glb".into(),
        });
        assert!(matches!(task.poll(), LoadPoll::Failed(LoadError::Parse { .. })));
    }

    #[test]
    fn source_url_only_for_documents() {
        let gltf = AssetSource::Gltf {
            url: "a.glb".into(),
        };
        assert_eq!(gltf.url(), Some("a.glb"));
        assert_eq!(AssetSource::Mesh(BoxSpec::default()).url(), None);
    }
}
