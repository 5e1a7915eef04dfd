//! Pressclip Core - Newspaper page clipping library
//!
//! This crate provides the core functionality for Pressclip: clip rectangle
//! geometry, pointer and wheel gesture interpretation, zoom with
//! resolution switching, multi-layer clip composition, and share
//! coordination.

pub mod assets;
pub mod compose;
pub mod encode;
pub mod geometry;
pub mod gesture;
pub mod raster;
pub mod resolution;
pub mod share;
pub mod zoom;

pub use compose::{ComposeRequest, Composer, CompositionResult, CompositionSettings};
pub use geometry::{hit_test, init_clip, resize, translate, Bounds, ClipRect, ContactZone, Handle};
pub use gesture::{GestureAdapter, GesturePhase, GestureUpdate};
pub use raster::RasterImage;
pub use resolution::{ResolutionAction, ResolutionManager};
pub use share::{ShareCoordinator, ShareRecord};
pub use zoom::ZoomState;
