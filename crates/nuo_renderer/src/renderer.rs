//! Progressive path tracer driving the kernels over a whole viewport.
//!
//! A frame runs the stages as data-parallel passes:
//! - emit one camera ray per pixel
//! - per bounce: intersect, gather ambient, emit and trace shadow rays,
//!   scatter the surviving paths
//!
//! Each pass finishes before the next one reads its output. Frames are
//! averaged into an accumulation buffer of linear radiance.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::RenderConfig;
use crate::integrator::{accumulate_ambient, accumulate_shadow, primary_ray_emit, scatter_ray};
use crate::intersector::IntersectionEngine;
use crate::material::Color;
use crate::shadow::{ShadowRayBuffers, SHADOW_RAY_SLOTS};
use crate::uniforms::{RandomBuffer, RayTracingUniforms, RayVolumeUniform};
use crate::{Intersection, RayBuffer, RayTracingScene};

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// Linear radiance per pixel, row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Gamma-corrected RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    pub fn mean(&self) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        self.pixels.iter().copied().sum::<Color>() / self.pixels.len() as f32
    }
}

/// Owns the scene, the intersection engine and every per-ray buffer.
pub struct PathTracer {
    scene: RayTracingScene,
    engine: Box<dyn IntersectionEngine>,
    config: RenderConfig,
    volume: RayVolumeUniform,
    tracing_uniforms: RayTracingUniforms,
    random: RandomBuffer,
    rng: StdRng,

    rays: Vec<RayBuffer>,
    intersections: Vec<Intersection>,
    shadow_rays: ShadowRayBuffers,
    shadow_intersections: [Vec<Intersection>; SHADOW_RAY_SLOTS],
    radiance: Vec<Color>,

    accumulator: ImageBuffer,
    frame_count: u32,
}

impl PathTracer {
    /// The config is assumed validated.
    pub fn new(
        scene: RayTracingScene,
        engine: Box<dyn IntersectionEngine>,
        config: RenderConfig,
    ) -> Self {
        let volume = config.ray_volume();
        let tracing_uniforms = config.tracing_uniforms(scene.bounds());
        let pixel_count = volume.pixel_count();

        info!(
            "Path tracer: {}x{}, {} bounces, {} triangles",
            config.width,
            config.height,
            config.max_bounces,
            scene.triangle_count()
        );

        Self {
            random: RandomBuffer::new(config.max_bounces),
            rng: StdRng::seed_from_u64(config.seed),
            rays: vec![RayBuffer::inactive(); pixel_count],
            intersections: vec![Intersection::MISS; pixel_count],
            shadow_rays: ShadowRayBuffers::new(pixel_count),
            shadow_intersections: std::array::from_fn(|_| vec![Intersection::MISS; pixel_count]),
            radiance: vec![Color::ZERO; pixel_count],
            accumulator: ImageBuffer::new(config.width, config.height),
            frame_count: 0,
            scene,
            engine,
            config,
            volume,
            tracing_uniforms,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn scene(&self) -> &RayTracingScene {
        &self.scene
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// The running average of all frames so far.
    pub fn image(&self) -> &ImageBuffer {
        &self.accumulator
    }

    /// Drop accumulated frames, e.g. after the camera moved.
    pub fn reset(&mut self) {
        self.accumulator.pixels.fill(Color::ZERO);
        self.frame_count = 0;
    }

    /// Trace one sample per pixel and fold it into the accumulator.
    pub fn render_frame(&mut self) -> &ImageBuffer {
        self.random.regenerate(&mut self.rng);
        self.trace_frame();

        let weight = 1.0 / (self.frame_count + 1) as f32;
        self.accumulator
            .pixels
            .par_iter_mut()
            .zip(self.radiance.par_iter())
            .for_each(|(accumulated, sample)| {
                *accumulated += (*sample - *accumulated) * weight;
            });
        self.frame_count += 1;

        debug!("Frame {} accumulated", self.frame_count);
        &self.accumulator
    }

    /// Accumulate `samples_per_pixel` frames.
    pub fn render(&mut self) -> &ImageBuffer {
        let start = std::time::Instant::now();
        for _ in 0..self.config.samples_per_pixel {
            self.render_frame();
        }
        info!(
            "Rendered {} frames in {:.2?}",
            self.config.samples_per_pixel,
            start.elapsed()
        );
        &self.accumulator
    }

    fn trace_frame(&mut self) {
        let volume = &self.volume;
        let tracing_uniforms = &self.tracing_uniforms;
        let random = &self.random;
        let view = self.scene.view(self.config.sampler);
        let max_bounces = self.config.max_bounces;

        self.rays
            .par_iter_mut()
            .enumerate()
            .for_each(|(ray_index, ray)| {
                *ray = primary_ray_emit(volume.thread_id(ray_index), volume, random);
            });
        self.radiance.fill(Color::ZERO);

        for bounce in 0..max_bounces {
            self.engine.intersect(&self.rays, &mut self.intersections);

            self.radiance
                .par_iter_mut()
                .zip(self.rays.par_iter_mut())
                .zip(self.intersections.par_iter())
                .for_each(|((radiance, ray), intersection)| {
                    *radiance += accumulate_ambient(ray, intersection, tracing_uniforms.ambient);
                });

            self.shadow_rays.emit(
                volume,
                &self.rays,
                &self.intersections,
                &view,
                tracing_uniforms,
                random,
            );

            for slot in 0..SHADOW_RAY_SLOTS {
                let shadow_rays = self.shadow_rays.slot(slot);
                self.engine
                    .intersect(shadow_rays, &mut self.shadow_intersections[slot]);

                self.radiance
                    .par_iter_mut()
                    .zip(shadow_rays.par_iter())
                    .zip(self.shadow_intersections[slot].par_iter())
                    .for_each(|((radiance, shadow_ray), intersection)| {
                        *radiance += accumulate_shadow(
                            shadow_ray,
                            intersection,
                            tracing_uniforms.illuminance_exposure,
                        );
                    });
            }

            self.rays
                .par_iter_mut()
                .zip(self.intersections.par_iter())
                .enumerate()
                .for_each(|(ray_index, (ray, intersection))| {
                    scatter_ray(
                        volume.thread_id(ray_index),
                        ray,
                        intersection,
                        &view,
                        tracing_uniforms,
                        random,
                        max_bounces,
                    );
                });

            if !self.rays.par_iter().any(RayBuffer::is_active) {
                debug!("All paths terminated after bounce {bounce}");
                break;
            }
        }
    }
}
