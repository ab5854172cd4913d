pub mod image_file_loader;
