// Re-export glam for convenience
pub use glam::*;

// Numeric token helpers shared by the decoder and the reader
mod numeric;
pub use numeric::{matrix_from_row_major, parse_float, snap_to_integer, INTEGER_EPSILON};
