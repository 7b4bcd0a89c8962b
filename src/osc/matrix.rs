use crate::osc::patch::NUM_OPS;
use crate::osc::scaling::scale_level;

/// Fixed-size carrier x modulator weight table. Entry `[i][j]` is the 0-1
/// amount operator j's previous output contributes to operator i's phase.
/// Loaded wholesale from a patch, never partially mutated at runtime.
#[derive(Debug, Clone)]
pub struct ModMatrix {
    weights: [[f32; NUM_OPS]; NUM_OPS],
}

impl ModMatrix {
    pub fn new() -> Self {
        Self {
            weights: [[0.0; NUM_OPS]; NUM_OPS],
        }
    }

    pub fn load(&mut self, raw: &[[u8; NUM_OPS]; NUM_OPS]) {
        for (row, raw_row) in self.weights.iter_mut().zip(raw.iter()) {
            for (weight, &amount) in row.iter_mut().zip(raw_row.iter()) {
                *weight = scale_level(amount as f32);
            }
        }
    }

    pub fn row(&self, carrier: usize) -> &[f32; NUM_OPS] {
        &self.weights[carrier]
    }
}

impl Default for ModMatrix {
    fn default() -> Self {
        Self::new()
    }
}
