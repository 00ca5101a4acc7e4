//! Room view: load the room once, index its interactive pieces and report
//! hover transitions while a pointer sweeps across the viewport.

#[path = "../tests/common/mod.rs"]
mod common;

use futures::executor::block_on;
use glam::Vec3;
use tidyroom_asset::{
    Camera, HoverEvent, HoverTracker, InteractiveIndex, MemorySource, ModelLoader, PickConfig,
    Picker, Pointer, RoomConfig, Scene, Viewport,
};

fn main() -> anyhow::Result<()> {
    let room = RoomConfig::default();
    let source = MemorySource::new().with_asset(&room.model_path, common::room_glb());
    let loader = ModelLoader::new(source);

    println!("tidyroom_asset v{}", tidyroom_asset::VERSION);
    let model = block_on(loader.load_model(&room.model_path))?;
    println!(
        "Loaded {} ({} meshes, {} triangles) in {:?}",
        model.metadata.source_path,
        model.meshes.len(),
        model.triangle_count(),
        model.metadata.load_duration
    );

    // A second view of the same room is served from the cache
    let again = block_on(loader.load_model(&room.model_path))?;
    println!(
        "Second load shares the model: {} (hit rate {:.0}%)",
        std::sync::Arc::ptr_eq(&model, &again),
        loader.metrics().cache_hit_rate()
    );

    let index = InteractiveIndex::build(&model, room.interactive_element_ids.as_slice());
    let picker = Picker::new(PickConfig::default()).with_targets(index);

    let mut scene = Scene::new();
    scene.attach(room.model_path.as_str(), model);

    let viewport = Viewport::new(0.0, 0.0, 1280.0, 720.0);
    let camera = Camera::perspective(
        Vec3::new(0.0, 1.5, 5.0),
        Vec3::ZERO,
        75.0,
        viewport.aspect(),
    );

    let mut hover = HoverTracker::new();
    for step in 0..=32 {
        let x = viewport.width * step as f32 / 32.0;
        let pointer = Pointer::from_client(x, viewport.height * 0.55, &viewport);
        match hover.update(picker.pick(pointer, Some(&scene), Some(&camera))) {
            Some(HoverEvent::Entered(hit)) => {
                println!("x={x:>6.1} enter {} at {:.2}", hit.name, hit.distance)
            }
            Some(HoverEvent::Changed { from, to }) => {
                println!("x={x:>6.1} {} -> {}", from.name, to.name)
            }
            Some(HoverEvent::Left(hit)) => println!("x={x:>6.1} leave {}", hit.name),
            None => {}
        }
    }

    Ok(())
}
