//! Pipeline constants
//!
//! Numeric limits shared by the transform, cull and clip stages.

/// Default near-plane distance in view-space units.
/// Anything closer to the eye than this is clipped away before projection.
pub const NEAR_PLANE: f32 = 0.1;

/// Maximum vertices a single model may carry (legacy 3DO limit)
pub const MAX_VERTEX_COUNT: usize = 500;

/// Maximum polygons a single model may carry (legacy 3DO limit)
pub const MAX_POLYGON_COUNT: usize = 400;

/// Largest coordinate magnitude a model or object position may use.
/// Keeps every value representable in 16.16 fixed-point.
pub const MAX_COORD: f32 = 32_000.0;

/// Farthest a vertex may sit from the eye on the fixed-point path.
/// Half the 16.16 range, so differences of two view-space values still fit.
pub const FIXED_VIEW_RANGE: f32 = 16_383.0;

/// Fractional bits of the 16.16 fixed-point format
pub const FRAC_BITS: u32 = 16;

/// 1.0 in 16.16 fixed-point
pub const FIXED_ONE: i32 = 1 << FRAC_BITS;
