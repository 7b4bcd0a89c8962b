// Shared numeric helpers for the oscillator engines. These stand in for the
// target platform's conversion and pitch intrinsics.

pub use core::f32::consts::{PI, TAU};

/// Highest frequency a note is allowed to reach, in Hz.
pub const NOTE_MAX_HZ: f32 = 23_679.6;

/// Fractional weight of one step of the 8-bit fine-pitch byte.
pub const NOTE_MOD_FSCALE: f32 = 1.0 / 255.0;

/// MIDI note number to frequency, A4 = 440 Hz.
pub fn note_hz(note: f32) -> f32 {
    440.0 * ((note - 69.0) / 12.0).exp2()
}

/// Per-sample phase increment for a note with an 8-bit fine-pitch byte.
/// The fine byte interpolates linearly between this note and the next. The
/// result is clipped to the representable range and floored at 1 Hz.
pub fn w0_for_note(note: i32, fine: u8, sample_rate_recip: f32) -> f32 {
    let note = note.clamp(0, 151) as f32;
    let mut hz = linint(fine as f32 * NOTE_MOD_FSCALE, note_hz(note), note_hz(note + 1.0));
    hz = hz.min(NOTE_MAX_HZ);
    if hz < 1.0 {
        hz = 1.0;
    }
    hz * sample_rate_recip
}

pub fn linint(frac: f32, a: f32, b: f32) -> f32 {
    a + frac * (b - a)
}

pub fn clip01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

pub fn clip_minmax(min: f32, x: f32, max: f32) -> f32 {
    x.clamp(min, max)
}

/// Decode a raw 10-bit host parameter value to [0, 1].
pub fn param_to_f32(value: i32) -> f32 {
    value as f32 / 1023.0
}

pub fn f32_to_q31(x: f32) -> i32 {
    (x.clamp(-1.0, 1.0) * 0x7fffffff as f32) as i32
}

pub fn q31_to_f32(x: i32) -> f32 {
    x as f32 / 0x7fffffff as f32
}

/// Convert a rendered float buffer to the platform's Q31 output format.
pub fn write_q31(src: &[f32], dst: &mut [i32]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = f32_to_q31(*s);
    }
}
