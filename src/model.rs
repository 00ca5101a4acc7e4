//! In-memory model representation
//!
//! A parsed model is an arena of nodes and meshes. Nodes refer to each
//! other and to meshes by index. World (model-space) matrices are computed
//! once when the model is assembled, so consumers never walk the hierarchy
//! per frame.

use crate::interaction::ray::Aabb;
use glam::{Mat4, Quat, Vec3};
use std::time::Duration;
use uuid::Uuid;

/// Identity of one parsed model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(Uuid);

impl ModelId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// How a primitive's indices are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points,
    Lines,
    /// Triangle list; strips and fans are converted at load time
    Triangles,
}

/// Geometry needed for intersection tests
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub mode: PrimitiveMode,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Local-space bounds, `None` for empty geometry
    pub bounds: Option<Aabb>,
}

impl Primitive {
    /// Create a primitive, computing its bounds
    pub fn new(mode: PrimitiveMode, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(&positions);
        Self {
            mode,
            positions,
            indices,
            bounds,
        }
    }

    /// Indexed triangle list
    pub fn triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self::new(PrimitiveMode::Triangles, positions, indices)
    }

    /// Axis-aligned box centered on the origin with the given half extents
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let positions = vec![
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 2, 3, 0, // front
            5, 4, 7, 7, 6, 5, // back
            4, 0, 3, 3, 7, 4, // left
            1, 5, 6, 6, 2, 1, // right
            3, 2, 6, 6, 7, 3, // top
            4, 5, 1, 1, 0, 4, // bottom
        ];
        Self::triangles(positions, indices)
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        match self.mode {
            PrimitiveMode::Triangles => self.indices.len() / 3,
            _ => 0,
        }
    }

    /// Iterate triangles, skipping any that reference missing vertices
    pub fn triangles_iter(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let indices: &[u32] = match self.mode {
            PrimitiveMode::Triangles => &self.indices,
            _ => &[],
        };
        indices.chunks_exact(3).filter_map(move |tri| {
            let a = *self.positions.get(tri[0] as usize)?;
            let b = *self.positions.get(tri[1] as usize)?;
            let c = *self.positions.get(tri[2] as usize)?;
            Some([a, b, c])
        })
    }
}

/// A named collection of primitives
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    pub fn new(name: Option<String>, primitives: Vec<Primitive>) -> Self {
        Self { name, primitives }
    }

    /// Union of all primitive bounds
    pub fn bounds(&self) -> Option<Aabb> {
        self.primitives
            .iter()
            .filter_map(|p| p.bounds)
            .reduce(|a, b| Aabb {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            })
    }
}

/// Local transform (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Camera definition carried by the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraDesc {
    Perspective {
        yfov: f32,
        aspect_ratio: Option<f32>,
        znear: f32,
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

/// Punctual light type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Point,
    Spot {
        inner_cone_angle: f32,
        outer_cone_angle: f32,
    },
}

/// Punctual light carried by the model
#[derive(Debug, Clone, PartialEq)]
pub struct LightDesc {
    pub name: Option<String>,
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: Option<f32>,
}

/// A node in the scene hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    /// Local transform relative to the parent
    pub transform: Transform,
    /// Model-space matrix, filled in when the model is assembled
    pub world: Mat4,
    pub mesh: Option<usize>,
    pub camera: Option<CameraDesc>,
    pub light: Option<LightDesc>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
}

impl Node {
    pub fn new(name: Option<String>, transform: Transform) -> Self {
        Self {
            name,
            transform,
            world: Mat4::IDENTITY,
            mesh: None,
            camera: None,
            light: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Name usable as an interaction target (non-empty)
    pub fn target_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// World-space position of the node origin
    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

/// Descriptive information about a loaded model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMetadata {
    /// Normalized path the model was loaded from
    pub source_path: String,
    pub generator: Option<String>,
    pub extensions_used: Vec<String>,
    /// Size of the primary payload in bytes
    pub byte_len: usize,
    pub load_duration: Duration,
}

/// A fully parsed model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    id: ModelId,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    /// Root nodes of the default scene
    pub roots: Vec<usize>,
    pub metadata: ModelMetadata,
    /// Depth-first order of nodes reachable from the roots
    order: Vec<usize>,
}

impl Model {
    /// Assemble a model, linking parents and computing world matrices.
    ///
    /// Child indices that are out of range or revisit a node are ignored.
    pub fn from_parts(
        mut nodes: Vec<Node>,
        meshes: Vec<Mesh>,
        roots: Vec<usize>,
        metadata: ModelMetadata,
    ) -> Self {
        let mut visited = vec![false; nodes.len()];
        let mut order = Vec::with_capacity(nodes.len());
        let mut stack: Vec<(usize, Mat4, Option<usize>)> = roots
            .iter()
            .rev()
            .filter(|&&r| r < nodes.len())
            .map(|&r| (r, Mat4::IDENTITY, None))
            .collect();

        while let Some((index, parent_world, parent)) = stack.pop() {
            if visited[index] {
                log::warn!("Node {index} is reachable more than once; ignoring repeat");
                continue;
            }
            visited[index] = true;

            let node = &mut nodes[index];
            node.parent = parent;
            node.world = parent_world * node.transform.matrix();
            if node.mesh.is_some_and(|m| m >= meshes.len()) {
                log::warn!("Node {index} references missing mesh");
                node.mesh = None;
            }
            order.push(index);

            let world = node.world;
            for &child in node.children.iter().rev() {
                if child < visited.len() {
                    stack.push((child, world, Some(index)));
                }
            }
        }

        Self {
            id: ModelId::new(),
            nodes,
            meshes,
            roots,
            metadata,
            order,
        }
    }

    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Visit reachable nodes depth-first
    pub fn traverse(&self, mut visit: impl FnMut(usize, &Node)) {
        for &index in &self.order {
            visit(index, &self.nodes[index]);
        }
    }

    /// Reachable nodes that carry a mesh
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (usize, &Node, &Mesh)> + '_ {
        self.order.iter().filter_map(move |&i| {
            let node = &self.nodes[i];
            let mesh = self.meshes.get(node.mesh?)?;
            Some((i, node, mesh))
        })
    }

    /// Reachable nodes that carry a camera
    pub fn cameras(&self) -> impl Iterator<Item = (usize, &Node, &CameraDesc)> + '_ {
        self.order.iter().filter_map(move |&i| {
            let node = &self.nodes[i];
            node.camera.as_ref().map(|c| (i, node, c))
        })
    }

    /// Reachable nodes that carry a light
    pub fn lights(&self) -> impl Iterator<Item = (usize, &Node, &LightDesc)> + '_ {
        self.order.iter().filter_map(move |&i| {
            let node = &self.nodes[i];
            node.light.as_ref().map(|l| (i, node, l))
        })
    }

    /// First reachable node with the given name
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.order
            .iter()
            .copied()
            .find(|&i| self.nodes[i].name.as_deref() == Some(name))
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Total triangle count across all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes
            .iter()
            .flat_map(|m| &m.primitives)
            .map(Primitive::triangle_count)
            .sum()
    }
}

/// Programmatic model construction
#[derive(Debug, Default)]
pub struct ModelBuilder {
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    roots: Vec<usize>,
}

impl ModelBuilder {
    /// Add a node with no parent; returns its index
    pub fn node(&mut self, name: &str, transform: Transform) -> usize {
        self.nodes.push(Node::new(Some(name.to_string()), transform));
        self.nodes.len() - 1
    }

    /// Add a node carrying a mesh
    pub fn mesh_node(&mut self, name: &str, transform: Transform, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        let index = self.node(name, transform);
        self.nodes[index].mesh = Some(self.meshes.len() - 1);
        index
    }

    /// Add a mesh node without a name
    pub fn unnamed_mesh_node(&mut self, transform: Transform, mesh: Mesh) -> usize {
        let index = self.mesh_node("", transform, mesh);
        self.nodes[index].name = None;
        index
    }

    /// Add a node carrying a camera
    pub fn camera_node(&mut self, name: &str, transform: Transform, camera: CameraDesc) -> usize {
        let index = self.node(name, transform);
        self.nodes[index].camera = Some(camera);
        index
    }

    pub fn child(&mut self, parent: usize, child: usize) -> &mut Self {
        self.nodes[parent].children.push(child);
        self
    }

    pub fn root(&mut self, index: usize) -> &mut Self {
        self.roots.push(index);
        self
    }

    pub fn build(self, source_path: &str) -> Model {
        Model::from_parts(
            self.nodes,
            self.meshes,
            self.roots,
            ModelMetadata {
                source_path: source_path.to_string(),
                ..Default::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Mesh {
        Mesh::new(None, vec![Primitive::cuboid(Vec3::splat(0.5))])
    }

    #[test]
    fn test_world_matrices_compose() {
        let mut b = Model::builder();
        let parent = b.node("parent", Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let child = b.mesh_node("child", Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)), cube());
        b.child(parent, child).root(parent);
        let model = b.build("test");

        assert_eq!(model.nodes[child].world_position(), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(model.nodes[child].parent, Some(parent));
        assert_eq!(model.mesh_nodes().count(), 1);
    }

    #[test]
    fn test_unreachable_nodes_are_skipped() {
        let mut b = Model::builder();
        let root = b.mesh_node("root", Transform::default(), cube());
        b.mesh_node("orphan", Transform::default(), cube());
        b.root(root);
        let model = b.build("test");

        let names: Vec<_> = model.mesh_nodes().map(|(_, n, _)| n.name.clone()).collect();
        assert_eq!(names, vec![Some("root".to_string())]);
        assert!(model.find_node("orphan").is_none());
    }

    #[test]
    fn test_cycles_do_not_loop() {
        let mut b = Model::builder();
        let a = b.node("a", Transform::default());
        let c = b.node("c", Transform::default());
        b.child(a, c).child(c, a).root(a);
        let model = b.build("test");

        let mut visited = Vec::new();
        model.traverse(|i, _| visited.push(i));
        assert_eq!(visited, vec![a, c]);
    }

    #[test]
    fn test_cuboid_geometry() {
        let prim = Primitive::cuboid(Vec3::splat(1.0));
        assert_eq!(prim.triangle_count(), 12);
        assert_eq!(prim.triangles_iter().count(), 12);
        assert_eq!(prim.bounds.unwrap().max, Vec3::ONE);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let prim = Primitive::triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2, 0, 1, 9]);
        assert_eq!(prim.triangles_iter().count(), 1);
    }

    #[test]
    fn test_target_name_rejects_empty() {
        let node = Node::new(Some(String::new()), Transform::default());
        assert!(node.target_name().is_none());
        let node = Node::new(Some("sofa".to_string()), Transform::default());
        assert_eq!(node.target_name(), Some("sofa"));
    }

    #[test]
    fn test_model_ids_are_unique() {
        let a = Model::builder().build("a");
        let b = Model::builder().build("b");
        assert_ne!(a.id(), b.id());
    }
}
