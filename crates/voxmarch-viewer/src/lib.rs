//! Interactive viewer built on `voxmarch-engine`.
//!
//! [`SceneConfig`] describes what to show (model, camera, lighting, noise),
//! [`Viewer`] opens a window and renders it progressively until closed.

pub mod app;
pub mod controls;
pub mod edit;
pub mod scene;

pub use app::{Viewer, VolumeEdit};
pub use edit::VolumeEditor;
pub use scene::{CameraSetup, ModelSource, SceneConfig};
