//! Example: build the arrow gizmo and print its buffers.
//!
//! Run with: cargo run --example inspect_arrow -- 2.0 0.5 1.0 1.0

use std::env;

use nuo_core::{ModelArrow, K_NUM_OF_FINS};

fn main() {
    env_logger::init();

    let args: Vec<f32> = env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    let [body_length, body_radius, head_length, head_radius] = match args.as_slice() {
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => {
            println!("Usage: inspect_arrow <body_length> <body_radius> <head_length> <head_radius>");
            println!("Using defaults 2.0 0.5 1.0 1.0");
            [2.0, 0.5, 1.0, 1.0]
        }
    };

    let mesh = ModelArrow::new(body_length, body_radius, head_length, head_radius).create_buffer();

    println!("\n=== Arrow ({} fins) ===", K_NUM_OF_FINS);
    println!("Vertices: {}", mesh.vertex_count());
    println!("Triangles: {}", mesh.triangle_count());
    println!("Bounds min: {}", mesh.bounds.min());
    println!("Bounds max: {}", mesh.bounds.max());

    let interleaved = mesh.interleaved();
    println!("Interleaved floats: {}", interleaved.len());

    println!("\n--- First triangle ---");
    for (i, vertex) in interleaved.chunks(6).take(3).enumerate() {
        println!(
            "  v{}: position ({:.3}, {:.3}, {:.3}) normal ({:.3}, {:.3}, {:.3})",
            i, vertex[0], vertex[1], vertex[2], vertex[3], vertex[4], vertex[5]
        );
    }
}
