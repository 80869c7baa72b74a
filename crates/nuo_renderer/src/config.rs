//! Render settings loaded from JSON.

use std::path::Path;

use nuo_core::Sampler;
use nuo_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::material::Color;
use crate::uniforms::{LightSource, RayTracingUniforms, RayVolumeUniform, SceneBounds};

/// Errors from reading or checking a [`RenderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// One infinite area light, aimed by Euler angles.
///
/// With both angles zero the light shines from +Z; negative pitch raises
/// it towards +Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    /// Radiance scale. Zero disables the light.
    pub density: f32,
    /// Half angle of the light cone.
    pub cone_angle_degrees: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            density: 0.0,
            cone_angle_degrees: 5.0,
        }
    }
}

impl LightConfig {
    pub fn to_uniform(&self) -> LightSource {
        LightSource::from_euler_degrees(
            self.yaw_degrees,
            self.pitch_degrees,
            self.density,
            self.cone_angle_degrees,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub vfov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.0, 4.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            vfov_degrees: 40.0,
        }
    }
}

/// Everything needed to render frames of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Frames accumulated by a full render.
    pub samples_per_pixel: u32,
    pub max_bounces: u32,
    pub seed: u64,
    /// Sky radiance seen by escaping paths.
    pub ambient: Color,
    pub illuminance_exposure: f32,
    /// Let translucent surfaces cast shadows.
    pub shadow_on_translucent: bool,
    pub sampler: Sampler,
    pub lights: [LightConfig; 2],
    pub camera: CameraConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            samples_per_pixel: 16,
            max_bounces: 4,
            seed: 0,
            ambient: Color::splat(0.3),
            illuminance_exposure: 1.0,
            shadow_on_translucent: false,
            sampler: Sampler::default(),
            lights: [
                LightConfig {
                    yaw_degrees: 30.0,
                    pitch_degrees: -60.0,
                    density: 1.0,
                    ..Default::default()
                },
                LightConfig::default(),
            ],
            camera: CameraConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the renderer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::Invalid("samples_per_pixel must be at least 1".into()));
        }
        if self.max_bounces == 0 {
            return Err(ConfigError::Invalid("max_bounces must be at least 1".into()));
        }
        if !(self.camera.vfov_degrees > 0.0 && self.camera.vfov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "vfov {} is outside (0, 180)",
                self.camera.vfov_degrees
            )));
        }
        if (self.camera.target - self.camera.eye).length_squared() == 0.0 {
            return Err(ConfigError::Invalid("camera eye and target coincide".into()));
        }
        // Covers a zero up vector as well
        let forward = self.camera.target - self.camera.eye;
        if forward.cross(self.camera.up).length_squared() <= 1e-12 {
            return Err(ConfigError::Invalid(
                "camera up is parallel to the view direction".into(),
            ));
        }
        for (i, light) in self.lights.iter().enumerate() {
            if light.density < 0.0 {
                return Err(ConfigError::Invalid(format!("light {i} has negative density")));
            }
            if !(0.0..90.0).contains(&light.cone_angle_degrees) {
                return Err(ConfigError::Invalid(format!(
                    "light {i} cone angle {} is outside [0, 90)",
                    light.cone_angle_degrees
                )));
            }
        }
        Ok(())
    }

    pub fn ray_volume(&self) -> RayVolumeUniform {
        RayVolumeUniform::look_at(
            self.camera.eye,
            self.camera.target,
            self.camera.up,
            self.camera.vfov_degrees,
            self.width,
            self.height,
        )
    }

    pub fn tracing_uniforms(&self, bounds: SceneBounds) -> RayTracingUniforms {
        RayTracingUniforms::new(
            [self.lights[0].to_uniform(), self.lights[1].to_uniform()],
            bounds,
            self.ambient,
            self.illuminance_exposure,
            self.shadow_on_translucent,
        )
    }
}
