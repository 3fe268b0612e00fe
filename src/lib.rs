//! Tonewalk - image colors as walking tones
//!
//! HTTP service around the `color-tones` engine: upload an image, then
//! stream movement samples and receive one tone per threshold crossing.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
