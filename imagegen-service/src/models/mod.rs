//! Domain models for the image generation service.

pub mod generation;

pub use generation::GenerateImagesResponse;
