pub const SVG_EXTENSIONS: [&str; 2] = ["svg", "svgz"];

/// Every thumbnail must fit inside a square with this side, in pixels.
pub const DEFAULT_BOUNDING_BOX: u32 = 400;

/// This is the target quality that we render thumbnails at, it is a float between 0-100
/// and is treated as a percentage (so 60% in this case, or it's the same as multiplying by `0.6`).
pub const TARGET_QUALITY: f32 = 60.0;

/// Source images bigger than this many bytes are refused before decoding.
pub const DEFAULT_MAXIMUM_FILE_SIZE: u64 = MIB * 24;

/// The size of 1MiB in bytes
const MIB: u64 = 1_048_576;
