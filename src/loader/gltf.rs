//! glTF/GLB parsing into [`Model`]
//!
//! Accepts binary GLB payloads and JSON glTF with embedded (`data:`) or
//! relative buffer URIs. Relative buffers are fetched through the same
//! [`AssetSource`] as the model itself. Draco-compressed primitives are
//! expanded through the loader's [`DecoderModule`].

use super::decoder::{CompressedPrimitive, DecoderModule, DRACO_EXTENSION};
use super::source::{AssetSource, FetchRequest};
use crate::config::CrossOrigin;
use crate::error::LoadCause;
use crate::model::{
    CameraDesc, LightDesc, LightKind, Mesh, Model, ModelMetadata, Node, Primitive, PrimitiveMode,
    Transform,
};
use base64::Engine;
use glam::{Quat, Vec3};
use gltf::Gltf;

/// Parse a fetched payload into a model
pub async fn parse_model(
    path: &str,
    bytes: Vec<u8>,
    source: &dyn AssetSource,
    cross_origin: CrossOrigin,
    decoder: &DecoderModule,
) -> Result<Model, LoadCause> {
    let gltf = parse_document(&bytes)?;
    let requires_draco = gltf.extensions_required().any(|e| e == DRACO_EXTENSION);

    log::debug!(
        "Parsed {path}: {} meshes, {} nodes, {} buffers",
        gltf.meshes().len(),
        gltf.nodes().len(),
        gltf.buffers().len()
    );

    let buffers = load_buffers(path, &gltf, source, cross_origin).await?;
    let meshes = gltf
        .meshes()
        .map(|mesh| read_mesh(&gltf, &buffers, mesh, requires_draco, decoder))
        .collect::<Result<Vec<_>, _>>()?;
    let nodes: Vec<Node> = gltf.nodes().map(read_node).collect();
    let roots = root_nodes(&gltf);

    let metadata = ModelMetadata {
        source_path: path.to_string(),
        generator: gltf.as_json().asset.generator.clone(),
        extensions_used: gltf.extensions_used().map(String::from).collect(),
        byte_len: bytes.len(),
        ..Default::default()
    };

    Ok(Model::from_parts(nodes, meshes, roots, metadata))
}

/// Parse the document, turning a panic inside the glTF crate's
/// validation into a load failure
fn parse_document(bytes: &[u8]) -> Result<Gltf, LoadCause> {
    match std::panic::catch_unwind(|| validate_document(bytes)) {
        Ok(parsed) => Ok(parsed?),
        Err(_) => Err(LoadCause::InvalidData(
            "glTF document references objects that do not exist".to_string(),
        )),
    }
}

/// Validate the document, tolerating Draco as the only unsupported
/// required extension
fn validate_document(bytes: &[u8]) -> Result<Gltf, gltf::Error> {
    match Gltf::from_slice(bytes) {
        Err(gltf::Error::Validation(errors))
            if errors
                .iter()
                .all(|(path, _)| path.to_string().starts_with("extensionsRequired")) =>
        {
            let gltf = Gltf::from_slice_without_validation(bytes)?;
            if gltf.extensions_required().all(|e| e == DRACO_EXTENSION) {
                Ok(gltf)
            } else {
                Err(gltf::Error::Validation(errors))
            }
        }
        other => other,
    }
}

async fn load_buffers(
    path: &str,
    gltf: &Gltf,
    source: &dyn AssetSource,
    cross_origin: CrossOrigin,
) -> Result<Vec<Vec<u8>>, LoadCause> {
    // Collect owned descriptions first so nothing borrowed from the
    // document is held across a fetch
    let specs: Vec<(usize, Option<String>)> = gltf
        .buffers()
        .map(|buffer| {
            let uri = match buffer.source() {
                gltf::buffer::Source::Bin => None,
                gltf::buffer::Source::Uri(uri) => Some(uri.to_string()),
            };
            (buffer.length(), uri)
        })
        .collect();

    let mut buffers = Vec::with_capacity(specs.len());
    for (index, (length, uri)) in specs.into_iter().enumerate() {
        let data = match uri {
            None => gltf.blob.clone().ok_or_else(|| {
                LoadCause::InvalidData(format!("buffer {index} refers to a missing binary chunk"))
            })?,
            Some(uri) if uri.starts_with("data:") => decode_data_uri(&uri)?,
            Some(uri) => {
                let request = FetchRequest::new(resolve_relative(path, &uri), cross_origin);
                log::debug!("Fetching external buffer {} for {path}", request.path);
                source.fetch(&request).await?
            }
        };

        if data.len() < length {
            return Err(LoadCause::InvalidData(format!(
                "buffer {index} holds {} bytes but declares {length}",
                data.len()
            )));
        }
        buffers.push(data);
    }
    Ok(buffers)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, LoadCause> {
    let (_, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| LoadCause::InvalidData("only base64 data URIs are supported".to_string()))?;
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Resolve a buffer URI against the directory of the model path
fn resolve_relative(model_path: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    match model_path.rfind('/') {
        Some(pos) => format!("{}{}", &model_path[..=pos], uri),
        None => uri.to_string(),
    }
}

fn read_mesh(
    gltf: &Gltf,
    buffers: &[Vec<u8>],
    mesh: gltf::Mesh<'_>,
    requires_draco: bool,
    decoder: &DecoderModule,
) -> Result<Mesh, LoadCause> {
    let mut primitives = Vec::new();

    for (prim_idx, primitive) in mesh.primitives().enumerate() {
        if let Some(ext) = primitive.extension_value(DRACO_EXTENSION) {
            match decode_compressed(gltf, buffers, mesh.index(), prim_idx, ext, decoder) {
                Ok(prim) => {
                    primitives.push(prim);
                    continue;
                }
                Err(e) if requires_draco => return Err(e),
                Err(e) => {
                    log::warn!(
                        "Mesh {} primitive {prim_idx}: {e}; using uncompressed accessors",
                        mesh.index()
                    );
                }
            }
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| {
                let err = format!(
                    "Mesh {} primitive {prim_idx} is missing positions",
                    mesh.index()
                );
                log::error!("{err}");
                LoadCause::InvalidData(err)
            })?
            .map(Vec3::from)
            .collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let (mode, indices) = assemble(primitive.mode(), indices);
        primitives.push(Primitive::new(mode, positions, indices));
    }

    Ok(Mesh::new(mesh.name().map(String::from), primitives))
}

fn decode_compressed(
    gltf: &Gltf,
    buffers: &[Vec<u8>],
    mesh: usize,
    primitive: usize,
    ext: &gltf::json::Value,
    decoder: &DecoderModule,
) -> Result<Primitive, LoadCause> {
    let view_index = ext
        .get("bufferView")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| LoadCause::InvalidData(format!("{DRACO_EXTENSION} without bufferView")))?;
    let view = gltf
        .views()
        .nth(view_index as usize)
        .ok_or_else(|| LoadCause::InvalidData(format!("buffer view {view_index} does not exist")))?;

    let data = buffers
        .get(view.buffer().index())
        .map(Vec::as_slice)
        .unwrap_or_default();
    let end = view.offset() + view.length();
    let payload = data.get(view.offset()..end).ok_or_else(|| {
        LoadCause::InvalidData(format!("buffer view {view_index} out of bounds: {end} > {}", data.len()))
    })?;

    let attributes = ext
        .get("attributes")
        .and_then(|a| a.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(name, id)| Some((name.clone(), id.as_u64()? as u32)))
                .collect()
        })
        .unwrap_or_default();

    let decoded = decoder.decoder()?.decode(&CompressedPrimitive {
        mesh,
        primitive,
        payload,
        attributes,
    })?;

    let indices = if decoded.indices.is_empty() {
        (0..decoded.positions.len() as u32).collect()
    } else {
        decoded.indices
    };
    Ok(Primitive::triangles(decoded.positions, indices))
}

/// Convert strips and fans to triangle lists; line modes collapse to lines
fn assemble(mode: gltf::mesh::Mode, indices: Vec<u32>) -> (PrimitiveMode, Vec<u32>) {
    use gltf::mesh::Mode;

    match mode {
        Mode::Points => (PrimitiveMode::Points, indices),
        Mode::Lines | Mode::LineStrip | Mode::LineLoop => (PrimitiveMode::Lines, indices),
        Mode::Triangles => (PrimitiveMode::Triangles, indices),
        Mode::TriangleStrip => {
            let list = indices
                .windows(3)
                .enumerate()
                .flat_map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .collect();
            (PrimitiveMode::Triangles, list)
        }
        Mode::TriangleFan => {
            let list = match indices.split_first() {
                Some((&hub, rest)) => rest
                    .windows(2)
                    .flat_map(|w| [hub, w[0], w[1]])
                    .collect(),
                None => Vec::new(),
            };
            (PrimitiveMode::Triangles, list)
        }
    }
}

fn read_node(node: gltf::Node<'_>) -> Node {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        translation: Vec3::from(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from(scale),
    };

    let mut out = Node::new(node.name().map(String::from), transform);
    out.mesh = node.mesh().map(|m| m.index());
    out.children = node.children().map(|c| c.index()).collect();
    out.camera = node.camera().map(|camera| match camera.projection() {
        gltf::camera::Projection::Perspective(p) => CameraDesc::Perspective {
            yfov: p.yfov(),
            aspect_ratio: p.aspect_ratio(),
            znear: p.znear(),
            zfar: p.zfar(),
        },
        gltf::camera::Projection::Orthographic(o) => CameraDesc::Orthographic {
            xmag: o.xmag(),
            ymag: o.ymag(),
            znear: o.znear(),
            zfar: o.zfar(),
        },
    });
    out.light = node.light().map(|light| {
        use gltf::khr_lights_punctual::Kind;
        LightDesc {
            name: light.name().map(String::from),
            kind: match light.kind() {
                Kind::Directional => LightKind::Directional,
                Kind::Point => LightKind::Point,
                Kind::Spot {
                    inner_cone_angle,
                    outer_cone_angle,
                } => LightKind::Spot {
                    inner_cone_angle,
                    outer_cone_angle,
                },
            },
            color: light.color(),
            intensity: light.intensity(),
            range: light.range(),
        }
    });
    out
}

/// Default scene roots, else the first scene, else every parentless node
fn root_nodes(gltf: &Gltf) -> Vec<usize> {
    if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        return scene.nodes().map(|n| n.index()).collect();
    }

    let mut has_parent = vec![false; gltf.nodes().len()];
    for node in gltf.nodes() {
        for child in node.children() {
            if let Some(flag) = has_parent.get_mut(child.index()) {
                *flag = true;
            }
        }
    }
    (0..has_parent.len()).filter(|&i| !has_parent[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_uri_resolution() {
        assert_eq!(resolve_relative("/models/room.gltf", "room.bin"), "/models/room.bin");
        assert_eq!(resolve_relative("room.gltf", "room.bin"), "room.bin");
        assert_eq!(resolve_relative("/models/room.gltf", "/cdn/room.bin"), "/cdn/room.bin");
    }

    #[test]
    fn test_data_uri_decoding() {
        let data = decode_data_uri("data:application/octet-stream;base64,AAEC").unwrap();
        assert_eq!(data, vec![0, 1, 2]);
        assert!(decode_data_uri("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_strip_and_fan_assembly() {
        use gltf::mesh::Mode;

        let (mode, list) = assemble(Mode::TriangleStrip, vec![0, 1, 2, 3]);
        assert_eq!(mode, PrimitiveMode::Triangles);
        assert_eq!(list, vec![0, 1, 2, 2, 1, 3]);

        let (_, list) = assemble(Mode::TriangleFan, vec![0, 1, 2, 3]);
        assert_eq!(list, vec![0, 1, 2, 0, 2, 3]);

        let (mode, _) = assemble(Mode::LineLoop, vec![0, 1, 2]);
        assert_eq!(mode, PrimitiveMode::Lines);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_document(b"not a model").is_err());
        assert!(parse_document(&[]).is_err());
    }

    #[test]
    fn test_dangling_accessor_is_invalid_data() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "meshes": [{"primitives": [{"attributes": {"POSITION": 7}}]}],
            "nodes": [{"mesh": 0}],
            "scenes": [{"nodes": [0]}]
        }"#;
        // Either the validator reports it or its panic is contained
        match parse_document(json) {
            Err(LoadCause::InvalidData(_)) | Err(LoadCause::Gltf(_)) => {}
            other => panic!("unexpected parse result: {:?}", other.map(|_| ())),
        }
    }
}
