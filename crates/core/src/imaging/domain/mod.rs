pub mod batch_image;
pub mod image_loader;
