//! Colored-box rendering for the jointlab harness
//!
//! A deliberately thin layer: one surface, one pipeline, one unit-cube mesh
//! drawn once per entity with an instance transform and color. The frame
//! protocol is clear, draw each box, present.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`camera::Camera`] - fixed viewpoint with a perspective projection
//! - [`box_pipeline::BoxPipeline`] - instanced unit-cube pipeline

pub mod box_pipeline;
pub mod camera;
pub mod context;
pub mod error;

pub use box_pipeline::BoxPipeline;
pub use camera::Camera;
pub use context::RenderContext;
pub use error::RenderError;
