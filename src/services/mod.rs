//! Sneaker catalogue services
//!
//! Leaf services (size conversion, validation, image storage) are composed
//! by [`sneaker_repository::SneakerRepository`], which the wizard drives
//! through the [`sneaker_repository::SneakerCommands`] trait.

pub mod image_pipeline;
pub mod size_conversion;
pub mod sneaker_repository;
pub mod sneaker_validation;

pub use image_pipeline::{ImagePipeline, PhotoOrigin, ProcessedImages};
pub use size_conversion::{SizeConversionEngine, SizeUnit, SIZE_TABLE};
pub use sneaker_repository::{SneakerCommands, SneakerRepository};
pub use sneaker_validation::{FormValidation, SneakerSchema};
