use crate::osc::envelope::Envelope;
use crate::osc::patch::{OpPatch, NUM_OPS};
use crate::osc::prelude::clip01;
use crate::osc::waveform::Waveform;

/// One FM operator: a phase accumulator in [0, 1), a frequency ratio relative
/// to the note's fundamental, and its own envelope. Phase is the only state
/// carried across samples; it resets to zero on note-on.
#[derive(Debug, Clone)]
pub struct Operator {
    phase: f32,
    ratio: f32,
    detune_hz: f32,
    pub waveform: Waveform,
    pub envelope: Envelope,
}

impl Operator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.ratio = 1.0;
        self.detune_hz = 0.0;
        self.envelope.reset();
    }

    pub fn note_on(&mut self) {
        self.phase = 0.0;
        self.envelope.note_on();
    }

    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    /// Bind this operator to a compiled patch entry. Ratio is
    /// `coarse * (1 + fine/100)` with coarse 0 playing a sub-octave, and
    /// detune (7 = center) becomes a small fixed frequency offset.
    pub fn set_patch(&mut self, op: &OpPatch, sample_rate: f32) {
        self.reset();

        let coarse = if op.coarse == 0 { 0.5 } else { op.coarse as f32 };
        self.ratio = coarse * (1.0 + op.fine.min(99) as f32 / 100.0);
        self.detune_hz = (op.detune.min(14) as f32 - 7.0) / 7.0;
        self.envelope.set_dx7(op.rates, op.levels, sample_rate);
    }

    /// Produce one sample. `prev` holds every operator's previous-sample
    /// output; `weights` scales each into this operator's phase. The waveform
    /// sees a temporary modulated phase while the accumulator itself advances
    /// only by the frequency increment.
    pub fn process_sample(
        &mut self,
        hz: f32,
        weights: &[f32; NUM_OPS],
        prev: &[f32; NUM_OPS],
        sample_rate_recip: f32,
    ) -> f32 {
        let level = self.envelope.next_level();

        self.phase += (self.ratio * hz + self.detune_hz) * sample_rate_recip;

        let mut modulated = self.phase;
        for (weight, value) in weights.iter().zip(prev.iter()) {
            modulated += weight * value;
        }
        while modulated < 0.0 {
            modulated += 1.0;
        }
        while modulated >= 1.0 {
            modulated -= 1.0;
        }

        let out = level * self.waveform.evaluate(clip01(modulated));

        while self.phase < 0.0 {
            self.phase += 1.0;
        }
        while self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.phase = clip01(self.phase);

        out
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self {
            phase: 0.0,
            ratio: 1.0,
            detune_hz: 0.0,
            waveform: Waveform::Sine,
            envelope: Envelope::new(),
        }
    }
}
