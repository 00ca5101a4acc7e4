//! Live scene composed of attached models
//!
//! Cached models are immutable and shared. Each attachment carries its own
//! placement transform, so several views can show the same cached model
//! without writing to it.

pub mod camera;

use crate::model::Model;
use glam::Mat4;
use std::collections::HashMap;
use std::sync::Arc;

pub use camera::{Camera, Projection};

/// Stable handle to an attached model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u32);

/// A model attached to the scene
#[derive(Debug, Clone)]
pub struct SceneInstance {
    pub id: InstanceId,
    /// Caller-chosen label, typically the model path
    pub label: String,
    pub model: Arc<Model>,
    /// Placement of the model root in the world
    pub transform: Mat4,
}

/// The scene the host renders and picks against
#[derive(Debug, Default, Clone)]
pub struct Scene {
    instances: Vec<SceneInstance>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a model at the world origin
    pub fn attach(&mut self, label: impl Into<String>, model: Arc<Model>) -> InstanceId {
        self.attach_with_transform(label, model, Mat4::IDENTITY)
    }

    pub fn attach_with_transform(
        &mut self,
        label: impl Into<String>,
        model: Arc<Model>,
        transform: Mat4,
    ) -> InstanceId {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        self.instances.push(SceneInstance {
            id,
            label: label.into(),
            model,
            transform,
        });
        id
    }

    /// Remove an attachment; returns it if present
    pub fn detach(&mut self, id: InstanceId) -> Option<SceneInstance> {
        let pos = self.instances.iter().position(|i| i.id == id)?;
        Some(self.instances.remove(pos))
    }

    /// Move an attachment; returns false for unknown ids
    pub fn set_transform(&mut self, id: InstanceId, transform: Mat4) -> bool {
        match self.instances.iter_mut().find(|i| i.id == id) {
            Some(instance) => {
                instance.transform = transform;
                true
            }
            None => false,
        }
    }

    pub fn instance(&self, id: InstanceId) -> Option<&SceneInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn instances(&self) -> &[SceneInstance] {
        &self.instances
    }

    pub(crate) fn instances_mut(&mut self) -> &mut [SceneInstance] {
        &mut self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

/// Lookup table from allow-listed names to mesh nodes of one model
///
/// Built once after a load instead of scanning the hierarchy on every
/// interaction.
#[derive(Debug, Clone, Default)]
pub struct InteractiveIndex {
    by_name: HashMap<String, usize>,
    missing: Vec<String>,
}

impl InteractiveIndex {
    pub fn build<S: AsRef<str>>(model: &Model, names: &[S]) -> Self {
        let mut by_name = HashMap::new();
        for (index, node, _) in model.mesh_nodes() {
            if let Some(name) = node.target_name() {
                if names.iter().any(|n| n.as_ref() == name) {
                    by_name.entry(name.to_string()).or_insert(index);
                }
            }
        }

        let missing: Vec<String> = names
            .iter()
            .map(|n| n.as_ref())
            .filter(|n| !by_name.contains_key(*n))
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            log::warn!(
                "Not all interactive elements were found in {}: missing {:?}",
                model.metadata.source_path,
                missing
            );
        }

        Self { by_name, missing }
    }

    /// Node index for an interactive name
    pub fn get(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Allow-listed names with no matching mesh node
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}
