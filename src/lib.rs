//! Brand studio - a two-step branded image edit service
//!
//! Accepts an uploaded image, asks a hosted image-edit API to strip its
//! background, then asks it again to composite a brand background and ring,
//! and hands the final image URL back to the browser.

pub mod ai;
pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;
pub mod server;
pub mod uploads;

pub use error::{Error, Result};
