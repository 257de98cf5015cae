pub mod stats;
pub mod video;
