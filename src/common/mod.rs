/// Sentinel thumbnail meaning "no custom thumbnail uploaded"; the frontend
/// maps it to its bundled placeholder image.
pub const DEFAULT_THUMBNAIL: &str = "SpacePlayer.png";

/// Display duration used until a client probes the real media duration.
pub const DEFAULT_DURATION: &str = "0:00";

pub const VALID_VIDEO_EXTENSIONS: &'static [&'static str] = &[
    "gif", "mp4", "webm", "mkv", "mov", "avi", "flv", "wmv", "mpeg",
];
