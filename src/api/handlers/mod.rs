pub mod files;
pub mod system;
pub mod upload;
pub mod videos;
