//! Shared fixture builder emitting real glTF/GLB payloads

#![allow(dead_code)]

use base64::Engine;
use serde_json::{json, Value};

/// Bytes the fixture stores as a Draco payload
pub const DRACO_PAYLOAD: &[u8] = b"DRACO-PAYLOAD";

pub const GENERATOR: &str = "tidyroom fixture";

#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 0,
    5, 4, 7, 7, 6, 5,
    4, 0, 3, 3, 7, 4,
    1, 5, 6, 6, 2, 1,
    3, 2, 6, 6, 7, 3,
    4, 5, 1, 1, 0, 4,
];

pub fn cube_positions(h: f32) -> Vec<[f32; 3]> {
    vec![
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
    ]
}

/// Incrementally assembled glTF document with one binary buffer
#[derive(Default)]
pub struct GltfFixture {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    meshes: Vec<Value>,
    nodes: Vec<Value>,
    cameras: Vec<Value>,
    roots: Vec<usize>,
    extensions_used: Vec<&'static str>,
    extensions_required: Vec<&'static str>,
}

impl GltfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_view(&mut self, bytes: &[u8]) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": self.bin.len(),
            "byteLength": bytes.len(),
        }));
        self.bin.extend_from_slice(bytes);
        self.views.len() - 1
    }

    fn push_positions(&mut self, positions: &[[f32; 3]], with_view: bool) -> usize {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for p in positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }

        let mut accessor = json!({
            "componentType": 5126,
            "count": positions.len(),
            "type": "VEC3",
            "min": min,
            "max": max,
        });
        if with_view {
            let bytes: Vec<u8> = positions
                .iter()
                .flatten()
                .flat_map(|v| v.to_le_bytes())
                .collect();
            accessor["bufferView"] = json!(self.push_view(&bytes));
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    fn push_indices(&mut self, indices: &[u32]) -> usize {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_view(&bytes);
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": 5125,
            "count": indices.len(),
            "type": "SCALAR",
        }));
        self.accessors.len() - 1
    }

    fn push_node(&mut self, node: Value) -> usize {
        self.nodes.push(node);
        let index = self.nodes.len() - 1;
        self.roots.push(index);
        index
    }

    fn named(mut node: Value, name: Option<&str>) -> Value {
        if let Some(name) = name {
            node["name"] = json!(name);
        }
        node
    }

    /// Root node carrying an indexed cube mesh
    pub fn cube(&mut self, name: Option<&str>, translation: [f32; 3], half: f32) -> usize {
        let positions = self.push_positions(&cube_positions(half), true);
        let indices = self.push_indices(&CUBE_INDICES);
        self.meshes.push(json!({
            "primitives": [{ "attributes": { "POSITION": positions }, "indices": indices }],
        }));
        let mesh = self.meshes.len() - 1;
        self.push_node(Self::named(
            json!({ "mesh": mesh, "translation": translation }),
            name,
        ))
    }

    /// Root node carrying a non-indexed triangle strip quad facing +Z
    pub fn strip_quad(&mut self, name: Option<&str>, translation: [f32; 3], half: f32) -> usize {
        let h = half;
        let positions = self.push_positions(&[[-h, -h, 0.0], [h, -h, 0.0], [-h, h, 0.0], [h, h, 0.0]], true);
        self.meshes.push(json!({
            "primitives": [{ "attributes": { "POSITION": positions }, "mode": 5 }],
        }));
        let mesh = self.meshes.len() - 1;
        self.push_node(Self::named(
            json!({ "mesh": mesh, "translation": translation }),
            name,
        ))
    }

    /// Root node whose cube mesh is Draco-compressed
    pub fn draco_cube(&mut self, name: Option<&str>, translation: [f32; 3], half: f32) -> usize {
        let positions = self.push_positions(&cube_positions(half), false);
        let payload = self.push_view(DRACO_PAYLOAD);
        self.meshes.push(json!({
            "primitives": [{
                "attributes": { "POSITION": positions },
                "extensions": {
                    "KHR_draco_mesh_compression": {
                        "bufferView": payload,
                        "attributes": { "POSITION": 0 },
                    },
                },
            }],
        }));
        if !self.extensions_used.contains(&"KHR_draco_mesh_compression") {
            self.extensions_used.push("KHR_draco_mesh_compression");
            self.extensions_required.push("KHR_draco_mesh_compression");
        }
        let mesh = self.meshes.len() - 1;
        self.push_node(Self::named(
            json!({ "mesh": mesh, "translation": translation }),
            name,
        ))
    }

    /// Root node with a perspective camera looking down -Z
    pub fn camera(&mut self, name: &str, translation: [f32; 3], yfov: f32) -> usize {
        self.cameras.push(json!({
            "type": "perspective",
            "perspective": { "yfov": yfov, "znear": 0.1, "zfar": 100.0 },
        }));
        let camera = self.cameras.len() - 1;
        self.push_node(json!({ "name": name, "camera": camera, "translation": translation }))
    }

    /// Group node parenting existing root nodes
    pub fn group(&mut self, name: &str, translation: [f32; 3], children: &[usize]) -> usize {
        self.roots.retain(|r| !children.contains(r));
        self.push_node(json!({ "name": name, "children": children, "translation": translation }))
    }

    fn padded_bin(&self) -> Vec<u8> {
        let mut bin = self.bin.clone();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        bin
    }

    fn document(&self, buffer_uri: Option<String>) -> Value {
        let bin = self.padded_bin();
        let mut buffer = json!({ "byteLength": bin.len() });
        if let Some(uri) = buffer_uri {
            buffer["uri"] = json!(uri);
        }

        let mut doc = json!({
            "asset": { "version": "2.0", "generator": GENERATOR },
            "scene": 0,
            "scenes": [{ "nodes": self.roots }],
            "nodes": self.nodes,
            "meshes": self.meshes,
            "accessors": self.accessors,
            "bufferViews": self.views,
            "buffers": [buffer],
        });
        if !self.cameras.is_empty() {
            doc["cameras"] = json!(self.cameras);
        }
        if !self.extensions_used.is_empty() {
            doc["extensionsUsed"] = json!(self.extensions_used);
            doc["extensionsRequired"] = json!(self.extensions_required);
        }
        doc
    }

    /// Binary GLB container
    pub fn glb(&self) -> Vec<u8> {
        let mut json = serde_json::to_vec(&self.document(None)).expect("fixture json");
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let bin = self.padded_bin();

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    /// JSON glTF with the buffer inlined as a base64 data URI
    pub fn embedded_gltf(&self) -> Vec<u8> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.padded_bin());
        let uri = format!("data:application/octet-stream;base64,{encoded}");
        serde_json::to_vec(&self.document(Some(uri))).expect("fixture json")
    }

    /// JSON glTF referencing an external buffer file, plus that file
    pub fn external_gltf(&self, buffer_uri: &str) -> (Vec<u8>, Vec<u8>) {
        let json = serde_json::to_vec(&self.document(Some(buffer_uri.to_string())))
            .expect("fixture json");
        (json, self.padded_bin())
    }
}

/// Room with the three interactive pieces plus an unnamed floor
pub fn room_glb() -> Vec<u8> {
    let mut f = GltfFixture::new();
    f.cube(Some("table"), [0.0, 0.0, 0.0], 0.5);
    f.cube(Some("sofa"), [2.0, 0.0, -1.0], 0.5);
    f.cube(Some("window"), [-2.0, 1.0, -2.0], 0.5);
    f.cube(None, [0.0, -3.0, 0.0], 2.0);
    f.glb()
}
