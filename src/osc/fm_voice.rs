use crate::osc::matrix::ModMatrix;
use crate::osc::operator::Operator;
use crate::osc::patch::{clip_patch_index, FmPatch, NUM_OPS, PATCHES};
use crate::osc::prelude::{linint, note_hz, param_to_f32, NOTE_MAX_HZ, NOTE_MOD_FSCALE};
use crate::osc::scaling::scale_level;
use crate::osc::{Oscillator, PARAM_ID1, PARAM_ID2, PARAM_SHAPE};

/// Patch-driven FM voice: `NUM_OPS` operators cross-modulated through a
/// weight matrix, mixed by per-operator output levels. Modulation uses each
/// operator's previous-sample output via a ping-pong buffer pair, giving the
/// one-sample feedback delay that keeps in-sample recursion impossible.
pub struct FmVoice {
    ops: [Operator; NUM_OPS],
    matrix: ModMatrix,
    output_level: [f32; NUM_OPS],
    prev_out: [[f32; NUM_OPS]; 2],
    front: usize,

    sample_rate: f32,
    sample_rate_recip: f32,
    note: u8,
    fine: u8,

    patch_index: usize,
    pending_patch: Option<usize>,
    gain: f32,
}

impl FmVoice {
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            ops: [Operator::new(), Operator::new(), Operator::new()],
            matrix: ModMatrix::new(),
            output_level: [0.0; NUM_OPS],
            prev_out: [[0.0; NUM_OPS]; 2],
            front: 0,
            sample_rate: sample_rate.max(1.0),
            sample_rate_recip: 1.0 / sample_rate.max(1.0),
            note: 69,
            fine: 0,
            patch_index: 0,
            pending_patch: None,
            gain: 1.0,
        };
        voice.load_patch(0);
        voice
    }

    pub fn patch(&self) -> &'static FmPatch {
        &PATCHES[self.patch_index]
    }

    pub fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn load_patch(&mut self, index: usize) {
        let index = clip_patch_index(index);
        let patch = &PATCHES[index];
        self.patch_index = index;

        for (op, op_patch) in self.ops.iter_mut().zip(patch.ops.iter()) {
            op.set_patch(op_patch, self.sample_rate);
        }
        for (level, op_patch) in self.output_level.iter_mut().zip(patch.ops.iter()) {
            *level = scale_level(op_patch.output_level as f32);
        }
        self.matrix.load(&patch.matrix);
    }

    fn reset_prev_out(&mut self) {
        self.prev_out = [[0.0; NUM_OPS]; 2];
        self.front = 0;
    }

    fn process_sample(&mut self, hz: f32) -> f32 {
        // Copy the back buffer so writes to the front never alias the reads.
        let prev = self.prev_out[1 - self.front];
        let mut mix = 0.0;

        for i in 0..NUM_OPS {
            let out = self.ops[i].process_sample(
                hz,
                self.matrix.row(i),
                &prev,
                self.sample_rate_recip,
            );
            self.prev_out[self.front][i] = out;
            mix += self.output_level[i] * out;
        }

        self.front = 1 - self.front;
        mix
    }
}

impl Oscillator for FmVoice {
    fn init(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.sample_rate_recip = 1.0 / self.sample_rate;
        self.reset_prev_out();
        // Segment durations depend on the sample rate; rebuild from the patch.
        self.load_patch(self.patch_index);
    }

    fn note_on(&mut self, note: u8, fine: u8) {
        self.note = note.min(127);
        self.fine = fine;
        self.reset_prev_out();
        for op in self.ops.iter_mut() {
            op.note_on();
        }
    }

    fn note_off(&mut self, _note: u8) {
        for op in self.ops.iter_mut() {
            op.note_off();
        }
    }

    fn set_param(&mut self, index: u16, value: u16) {
        match index {
            PARAM_SHAPE => {
                self.gain = param_to_f32(value as i32).clamp(0.0, 1.0);
            }
            PARAM_ID1 => {
                // Bank select. Only one bank is compiled in, so any value
                // resolves to it.
            }
            PARAM_ID2 => {
                // Applied at the top of the next block, never mid-block.
                self.pending_patch = Some(clip_patch_index(value as usize));
            }
            _ => {}
        }
    }

    fn render(&mut self, output: &mut [f32]) {
        if output.is_empty() {
            return;
        }

        if let Some(index) = self.pending_patch.take() {
            self.load_patch(index);
        }

        let f0 = note_hz(self.note as f32);
        let f1 = note_hz(self.note as f32 + 1.0);
        let mut hz = linint(self.fine as f32 * NOTE_MOD_FSCALE, f0, f1);
        hz = hz.min(NOTE_MAX_HZ);
        if hz < 1.0 {
            hz = 1.0;
        }

        for sample in output.iter_mut() {
            *sample = self.gain * self.process_sample(hz);
        }
    }
}
