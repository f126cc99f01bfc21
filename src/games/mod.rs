//! Bundled game titles.

pub mod sample;
