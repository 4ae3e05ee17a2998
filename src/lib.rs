//! DigitalGlue core — an image-mask compositor.
//!
//! Blends two raster images pixel-by-pixel according to a grayscale mask.
//! Masks come from procedural patterns or uploaded images, and can be
//! reshaped with artistic edge effects before compositing. Each source gets
//! independent brightness/contrast/saturation adjustment.
//!
//! The pixel pipeline ([`ops`]) is pure and synchronous; [`worker`] wraps it
//! behind a message-passing boundary so hosts can run it off their event
//! loop. [`project`] and [`history`] carry the serializable session state and
//! its undo stack; [`io`] handles decoding, export, and .glue project files.

pub mod cli;
pub mod history;
pub mod io;
pub mod logger;
pub mod ops;
pub mod project;
pub mod raster;
pub mod worker;

pub use raster::Raster;
