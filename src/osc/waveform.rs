use crate::osc::prelude::TAU;

/// The closed set of waveforms an operator can run. Phase domain is [0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
    Parabola,
}

impl Waveform {
    /// Decode the combined 0-15 shape-pair index used by the host:
    /// carrier = index / 4, modulator = index % 4.
    pub fn decode_pair(index: u16) -> (Waveform, Waveform) {
        (Self::from_index(index / 4), Self::from_index(index % 4))
    }

    pub fn from_index(index: u16) -> Waveform {
        match index {
            0 => Waveform::Sine,
            1 => Waveform::Sawtooth,
            2 => Waveform::Square,
            3 => Waveform::Parabola,
            _ => Waveform::Sine,
        }
    }

    /// Evaluate at `phase`. Out-of-range phases (from modulation offsets) are
    /// wrapped back into [0, 1) first.
    pub fn evaluate(self, phase: f32) -> f32 {
        let p = phase - phase.floor();
        match self {
            Waveform::Sine => (TAU * p).sin(),
            Waveform::Sawtooth => 2.0 * p - 1.0,
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            // Parabolic pseudo-triangle: -1 at the cycle edges, +1 at the center.
            Waveform::Parabola => 8.0 * p * (1.0 - p) - 1.0,
        }
    }
}
