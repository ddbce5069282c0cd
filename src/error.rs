//! Error types for shoal.
//!
//! This module provides error types for configuration validation, GPU
//! initialization, and simulation lifecycle violations.

use std::fmt;

/// Errors produced while validating a [`crate::SimulationConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Particle count must be greater than zero.
    ParticleCount(u32),
    /// Group count must be at least one.
    GroupCount(u32),
    /// Speed bounds must satisfy `0 <= min < max`.
    SpeedBounds { min: f32, max: f32 },
    /// A behavior term (separation/alignment/cohesion) has a non-positive
    /// distance or a negative weight.
    Behavior { term: &'static str },
    /// Wall weight must be non-negative.
    WallWeight(f32),
    /// Box extents must all be positive.
    BoxExtents { x: f32, y: f32, z: f32 },
    /// Shell radii must satisfy `0 < inner < outer`.
    ShellRadii { inner: f32, outer: f32 },
    /// Burst spawn radius must be positive.
    BurstRadius(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParticleCount(n) => {
                write!(f, "Particle count must be > 0, got {}", n)
            }
            ConfigError::GroupCount(n) => write!(f, "Group count must be >= 1, got {}", n),
            ConfigError::SpeedBounds { min, max } => {
                write!(f, "Speed bounds must satisfy 0 <= min < max, got min={}, max={}", min, max)
            }
            ConfigError::Behavior { term } => {
                write!(f, "{} requires distance > 0 and weight >= 0", term)
            }
            ConfigError::WallWeight(w) => write!(f, "Wall weight must be >= 0, got {}", w),
            ConfigError::BoxExtents { x, y, z } => {
                write!(f, "Box extents must all be > 0, got ({}, {}, {})", x, y, z)
            }
            ConfigError::ShellRadii { inner, outer } => {
                write!(f, "Shell radii must satisfy 0 < inner < outer, got inner={}, outer={}", inner, outer)
            }
            ConfigError::BurstRadius(r) => write!(f, "Burst spawn radius must be > 0, got {}", r),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur during GPU initialization and readback.
#[derive(Debug)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    NoAdapter,
    /// The adapter does not support compute shaders (required for the
    /// behavior kernel).
    ComputeUnsupported,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// Failed to map a staging buffer for readback.
    BufferMapping(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::ComputeUnsupported => write!(
                f,
                "The GPU adapter does not support compute shaders; the simulation cannot run on this device."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors surfaced by the [`crate::Simulation`] facade.
#[derive(Debug)]
pub enum SimulationError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// An operation requiring GPU state was called before `initialize`.
    Uninitialized,
    /// The simulation was disposed; only construction of a new simulation
    /// is valid from here.
    Disposed,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "Invalid configuration: {}", e),
            SimulationError::Gpu(e) => write!(f, "GPU error: {}", e),
            SimulationError::Uninitialized => {
                write!(f, "Simulation is not initialized. Call initialize() first.")
            }
            SimulationError::Disposed => write!(f, "Simulation has been disposed."),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::Gpu(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

impl From<GpuError> for SimulationError {
    fn from(e: GpuError) -> Self {
        SimulationError::Gpu(e)
    }
}
