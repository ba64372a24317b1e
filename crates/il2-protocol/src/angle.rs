//! Orientation angle conversion.
//!
//! The simulator reports roll wrapping at ±180°. Motion rigs want a value
//! centred on level flight, so anything past the threshold is reflected
//! back towards zero: 135° becomes 45°, -135° becomes -45°.

use core::f32::consts::PI;

/// Roll magnitude, in degrees, past which the angle is reflected.
pub const DEFAULT_ROLL_THRESHOLD_DEG: f32 = 90.0;

const RAD_TO_DEG: f32 = 180.0 / PI;

/// Convert radians to degrees.
#[inline]
pub fn radians_to_degrees(radians: f32) -> f32 {
    radians * RAD_TO_DEG
}

/// Reflect a roll angle (degrees) that exceeds `threshold_deg` in magnitude.
///
/// Angles within the threshold, zero included, are returned unchanged.
pub fn normalize_roll(angle_deg: f32, threshold_deg: f32) -> f32 {
    if angle_deg.abs() <= threshold_deg {
        return angle_deg;
    }

    let direction = if angle_deg.is_sign_negative() {
        -1.0
    } else {
        1.0
    };
    180.0 * direction - angle_deg
}
