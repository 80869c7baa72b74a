//! Renders the arrow gizmo over a ground plane and saves it as PPM.
//!
//! Usage: `render_arrow [config.json] [output.ppm]`

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use nuo_core::{Mesh, ModelArrow};
use nuo_renderer::{
    color_to_rgba, BruteForceIntersector, CameraConfig, Color, ImageBuffer, PathTracer,
    RayTracingScene, RenderConfig, SurfaceDesc, Vec3,
};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RenderConfig::from_json_file(&path)
            .with_context(|| format!("loading render config {path}"))?,
        None => RenderConfig {
            width: 400,
            height: 300,
            samples_per_pixel: 32,
            camera: CameraConfig {
                eye: Vec3::new(3.0, 2.5, 4.0),
                target: Vec3::new(0.0, 0.3, 0.8),
                ..Default::default()
            },
            ..Default::default()
        },
    };
    let output = args.next().unwrap_or_else(|| "arrow.ppm".to_string());

    let start = std::time::Instant::now();
    let scene = build_scene()?;
    log::info!("Scene built in {:?}", start.elapsed());

    let engine = BruteForceIntersector::new(&scene);
    let mut tracer = PathTracer::new(scene, Box::new(engine), config);
    let image = tracer.render();

    save_ppm(image, &output).with_context(|| format!("writing {output}"))?;
    log::info!("Saved to {output}");
    Ok(())
}

fn build_scene() -> Result<RayTracingScene> {
    let arrow = ModelArrow::new(1.2, 0.15, 0.5, 0.3).create_buffer();

    let y = -0.3;
    let ground = Mesh::from_buffers(
        vec![
            Vec3::new(-20.0, y, -20.0),
            Vec3::new(-20.0, y, 20.0),
            Vec3::new(20.0, y, 20.0),
            Vec3::new(20.0, y, -20.0),
        ],
        vec![Vec3::Y; 4],
        vec![0, 1, 2, 0, 2, 3],
    );

    let shiny_red = SurfaceDesc {
        diffuse_color: Color::new(0.7, 0.08, 0.05),
        specular_color: Color::splat(0.2),
        shininess: 40.0,
        dissolve: 1.0,
    };

    Ok(RayTracingScene::from_meshes(&[
        (ground, SurfaceDesc::diffuse(Color::splat(0.6))),
        (arrow, shiny_red),
    ])?)
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for y in 0..image.height {
        for x in 0..image.width {
            let rgba = color_to_rgba(image.get(x, y));
            writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
        }
    }

    writer.flush()
}
