//! Product showcase: preload a catalogue, arrange the products on a
//! rotating carousel and let dust drift through the room.

#[path = "../tests/common/mod.rs"]
mod common;

use common::GltfFixture;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tidyroom_asset::{
    AsyncSpawner, CarouselConfig, DustConfig, DustField, InlineSpawner, MemorySource,
    ModelLoader, ProductCarousel, Scene,
};

const CATALOGUE: [&str; 3] = ["/models/mop.glb", "/models/bucket.glb", "/models/spray.glb"];

fn product(name: &str, half: f32) -> Vec<u8> {
    let mut fixture = GltfFixture::new();
    fixture.cube(Some(name), [0.0, 0.0, 0.0], half);
    fixture.glb()
}

fn main() -> anyhow::Result<()> {
    let source = MemorySource::new();
    for (i, path) in CATALOGUE.iter().enumerate() {
        source.insert(path, product(path, 0.2 + 0.05 * i as f32));
    }
    let loader = ModelLoader::new(source);

    let spawner = InlineSpawner::new();
    let handles = loader.preload(&spawner, &CATALOGUE);
    println!("Preloaded {} products on {}", handles.len(), spawner.runtime_name());

    // Invalid and missing entries are reported and skipped
    let mut scene = Scene::new();
    let requested = [CATALOGUE[0], "  ", CATALOGUE[1], "/models/broom.glb", CATALOGUE[2]];
    for (path, result) in futures::executor::block_on(loader.load_many(&requested)) {
        match result {
            Ok(model) => {
                scene.attach(path, model);
            }
            Err(e) => println!("skipping {path:?}: {e}"),
        }
    }

    let carousel = ProductCarousel::new(CarouselConfig::default());
    for frame in [0.0_f32, 60.0, 120.0] {
        carousel.apply(&mut scene, frame);
        for instance in scene.instances() {
            let p = instance.transform.w_axis.truncate();
            println!("t={frame:>5.1} {:<20} ({:+.2}, {:+.2})", instance.label, p.x, p.z);
        }
    }

    let mut rng = StdRng::seed_from_u64(42);
    let mut dust = DustField::new(&DustConfig::default(), &mut rng);
    for _ in 0..120 {
        dust.step(&mut rng);
    }
    println!("{} dust motes after 120 frames, first at {:?}", dust.len(), dust.positions()[0]);

    Ok(())
}
