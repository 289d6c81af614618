//! Ripforge - DVD and video file ripping automation
//!
//! This library crate exposes the pipeline for integration testing.

pub mod config;
pub mod pipeline;
