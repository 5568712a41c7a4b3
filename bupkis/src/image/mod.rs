//! Presentation of image records.

pub mod types;

pub use types::images_to_rows;
