//! Colour curves for trail points.
//!
//! Hues are expressed as turns in `[0, 1)`. Conversions follow the usual
//! HSL definition (hue wrapped, saturation and lightness clamped) and return
//! sRGB components in `[0, 1]`.

use std::f32::consts::PI;

/// Hue drift across the whole buffer at construction.
const BUFFER_HUE_SPAN: f32 = 0.15;
/// Amplitude of the wobble layered over the construction hue ramp.
const BUFFER_HUE_WOBBLE: f32 = 0.03;
/// Peak opacity of the newest construction slot.
const MAX_OPACITY: f32 = 0.6;
/// Point size of the newest construction slot.
const MAX_SIZE: f32 = 2.0;

/// Speed of the per-frame hue cycle.
const FRAME_HUE_RATE: f64 = 0.08;
const FRAME_SATURATION: f32 = 0.75;
const FRAME_LIGHTNESS: f32 = 0.55;

/// Convert HSL to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Shortest distance between two hues on the colour wheel.
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(1.0);
    d.min(1.0 - d)
}

/// Hue of the construction slot at normalised buffer position `t`.
pub fn slot_hue(base_hue: f32, t: f32) -> f32 {
    (base_hue + t * BUFFER_HUE_SPAN + (t * PI * 2.0).sin() * BUFFER_HUE_WOBBLE).rem_euclid(1.0)
}

/// Colour of the construction slot at normalised buffer position `t`.
///
/// Saturation and lightness oscillate at different rates so the gradient
/// never bands.
pub fn slot_color(base_hue: f32, t: f32) -> [f32; 3] {
    let saturation = 0.7 + (t * PI * 1.5).sin() * 0.2;
    let lightness = 0.4 + (t * PI * 3.0).sin() * 0.15;
    hsl_to_rgb(slot_hue(base_hue, t), saturation, lightness)
}

/// Opacity of the construction slot at `t`; older slots are dimmer.
pub fn slot_opacity(t: f32) -> f32 {
    (1.0 - t).max(0.0).powf(1.5) * MAX_OPACITY
}

/// Point size of the construction slot at `t`; older slots are smaller.
pub fn slot_size(t: f32) -> f32 {
    MAX_SIZE * (1.0 - t.max(0.0).powf(0.4))
}

/// Hue written by a frame update of system `index` at virtual time `elapsed`.
pub fn frame_hue(base_hue: f32, elapsed: f64, index: usize) -> f32 {
    let u = (elapsed + index as f64) * FRAME_HUE_RATE;
    (base_hue as f64 + u + (u * 1.8).sin() * 0.08).rem_euclid(1.0) as f32
}

/// Colour written by a frame update of system `index` at virtual time `elapsed`.
pub fn frame_color(base_hue: f32, elapsed: f64, index: usize) -> [f32; 3] {
    hsl_to_rgb(
        frame_hue(base_hue, elapsed, index),
        FRAME_SATURATION,
        FRAME_LIGHTNESS,
    )
}
