//! Angle helpers. All angles are radians, counter-clockwise.

use std::f32::consts::{PI, TAU};

/// Wrap into `(-PI, PI]`.
pub fn reduce(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Wrap into `[0, TAU)`.
pub fn normalize(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Round to `decimals` digits.
pub fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f32.powi(decimals);
    let rounded = (value * scale).round() / scale;
    // Avoid distinguishing -0.0 from 0.0 in rounded comparisons.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Two angles are the same heading once their difference is rounded.
pub fn approx_eq(a: f32, b: f32, decimals: i32) -> bool {
    round_to(reduce(a - b), decimals) == 0.0
}
