//! A scene of models managed by a `handle_pool`:
//!
//! * Creating entries and writing to them through handles.
//! * Destroying entries while other handles stay valid.
//! * Re-acquiring handles from stored identifiers.
//! * Printing the internal state of the pool for debugging.

use handle_pool::{Handle, HandleId, HandlePool};

#[derive(Debug, Default)]
struct Model {
    a: i32,
    b: i32,
}

type GameObject = Handle<Model>;
type Scene = HandlePool<Model>;

fn debug_scene(title: &str, scene: &Scene) {
    println!("----- {title} -----");
    print!("{}", scene.dump());
}

fn main() -> handle_pool::Result<()> {
    let mut scene = Scene::new();

    let go: GameObject = scene.create();
    go.resolve(&mut scene)?.a = 10;
    go.resolve(&mut scene)?.b = 20;

    let go2 = scene.create();
    go2.resolve(&mut scene)?.a = 5;

    let go3 = scene.create();
    go3.resolve(&mut scene)?.a = 6;

    debug_scene("created 3 objects", &scene);

    scene.destroy(go2)?;

    // The other handles do not care that the storage was rearranged.
    go3.resolve(&mut scene)?.a = 666;

    debug_scene("destroyed object 2", &scene);

    for i in 0..5 {
        let new_go = scene.create();
        new_go.resolve(&mut scene)?.a = 100 + i;
    }

    debug_scene("created 5 more objects", &scene);

    // Identifiers can be stored on their own and turned back into handles.
    for id in 4..7 {
        let stored = scene.get_by_id(HandleId::new(id))?;
        scene.destroy(stored)?;
    }

    debug_scene("destroyed 3 objects by id", &scene);

    // A handle to a destroyed entry is rejected instead of pointing at something else.
    match go2.get(&scene) {
        Ok(model) => println!("unexpectedly resolved a destroyed object: {model:?}"),
        Err(error) => println!("resolving object 2 again: {error}"),
    }

    let go4 = scene.create();
    go4.resolve(&mut scene)?.a = 32;

    // Copies of a handle refer to the same entry.
    let go4_copy = go4;
    go4_copy.resolve(&mut scene)?.b = 32;

    debug_scene("created object 4 and wrote through a copy", &scene);

    scene.destroy(go4)?;

    let first = go.get(&scene)?;
    println!(
        "{} objects remain, first object has a = {}, b = {}",
        scene.len(),
        first.a,
        first.b
    );

    Ok(())
}
