use crate::osc::scaling::{clip_raw, scale_output_level, STATICS};

// Stage indices: 0 pre-attack, 1 attack, 2 decay, 3 sustain, 4 post-release.
// Stage 3 doubles as the release ramp once the key is up (its rate/level slot
// holds the release parameters), and 4 is the terminal stage.

// Rising segments never start below this Q8.24 level (6.703125), matching the
// hardware's attack jump.
const JUMP_TARGET: i32 = 1716;

// Level bias applied when converting a scaled output level into the Q8.24
// target domain. Calibrated against hardware envelope output.
const LEVEL_BIAS: i32 = 4256;

// Targets are floored here so a decay toward "zero" still terminates.
const MIN_TARGET: i32 = 16;

/// Logarithmic-level envelope in Q8.24, advanced once per audio block. The
/// level accumulator is in log2 units; callers convert with `exp2` to obtain
/// a gain. Stage changes happen only through `advance`.
#[derive(Debug, Clone)]
pub struct LogEnv {
    // Knob set, raw 0-99.
    pub attack_rate: i32,
    pub decay_rate: i32,
    pub release_rate: i32,
    pub attack_level: i32,
    pub decay_level: i32,
    /// Output-level offset applied to every stage target ("max env" knob).
    pub max_env_val: i32,

    rates: [i32; 4],
    levels: [i32; 4],
    level: i32,
    target: i32,
    outlevel: i32,
    rising: bool,
    ix: usize,
    inc: i32,
    static_count: i32,
    down: bool,
    sr_multiplier: i64,
}

impl LogEnv {
    pub fn new(sample_rate: f64) -> Self {
        let mut env = Self {
            attack_rate: 99,
            decay_rate: 99,
            release_rate: 99,
            attack_level: 99,
            decay_level: 0,
            max_env_val: 0,
            rates: [99, 99, 99, 99],
            levels: [0, 0, 89, 0],
            level: 0,
            target: 0,
            outlevel: 0,
            rising: false,
            ix: 0,
            inc: 0,
            static_count: 0,
            down: true,
            sr_multiplier: 1 << 24,
        };
        env.init_sr(sample_rate);
        env.trigger();
        env
    }

    /// Q24 correction factor; unity at 44.1 kHz. Truncated, not rounded.
    pub fn init_sr(&mut self, sample_rate: f64) {
        self.sr_multiplier = ((44100.0 / sample_rate) * (1 << 24) as f64) as i64;
    }

    fn load_knobs(&mut self) {
        self.rates[0] = clip_raw(self.attack_rate);
        self.rates[1] = clip_raw(self.decay_rate);
        self.rates[3] = clip_raw(self.release_rate);
        self.levels[0] = clip_raw(self.attack_level);
        self.levels[1] = clip_raw(self.decay_level);

        let mut outlevel = scale_output_level(self.max_env_val);
        if outlevel > 127 {
            outlevel = 127;
        }
        self.outlevel = outlevel << 5;
    }

    /// Key-down path: restart from silence at the idle stage.
    pub fn trigger(&mut self) {
        self.load_knobs();
        self.level = 0;
        self.down = true;
        self.advance(0);
    }

    /// Live knob changes while a note is held: retarget the sustain stage
    /// without resetting the level. No-op once the key is up.
    pub fn update(&mut self) {
        self.load_knobs();
        if self.down {
            self.advance(2);
        }
    }

    /// Only acts on an actual transition of the held flag: press restarts the
    /// envelope, release forces the release stage.
    pub fn keydown(&mut self, down: bool) {
        if self.down != down {
            self.down = down;
            self.advance(if down { 0 } else { 3 });
        }
    }

    /// Advance by `frames` samples and return the current Q8.24 log level.
    /// Rising stages scale the step by the distance left to the ceiling;
    /// falling stages subtract a fixed step. The sustain stage holds while
    /// the key is down.
    pub fn sample(&mut self, frames: i32) -> i32 {
        if self.static_count != 0 {
            self.static_count -= frames;
            if self.static_count <= 0 {
                self.static_count = 0;
                self.advance(self.ix + 1);
            }
        }

        if self.ix < 3 || (self.ix < 4 && !self.down) {
            if self.rising {
                if self.level < (JUMP_TARGET << 16) {
                    self.level = JUMP_TARGET << 16;
                }
                self.level += (((17 << 24) - self.level) >> 24) * self.inc;
                if self.level >= self.target {
                    self.level = self.target;
                    self.advance(self.ix + 1);
                }
            } else if self.static_count != 0 {
                // zero-slope hold still counting down
            } else {
                self.level -= self.inc;
                if self.level <= self.target {
                    self.level = self.target;
                    self.advance(self.ix + 1);
                }
            }
        }

        self.level
    }

    /// Stage transition: compute the new target and per-block increment, or
    /// arm a frame-count hold when the target equals the current level.
    fn advance(&mut self, new_ix: usize) {
        self.ix = new_ix;

        if self.ix < 4 {
            let new_level = self.levels[self.ix];
            let mut actual = scale_output_level(new_level) >> 1;
            actual = (actual << 6) + self.outlevel - LEVEL_BIAS;
            if actual < MIN_TARGET {
                actual = MIN_TARGET;
            }

            self.target = actual << 16;
            self.rising = self.target > self.level;

            // Quantize the 0-99 rate down to a 0-63 rate class.
            let qrate = (self.rates[self.ix] * 41) >> 6;

            if self.target == self.level {
                let static_rate = self.rates[self.ix];
                let count = if (static_rate as usize) < STATICS.len() {
                    STATICS[static_rate as usize]
                } else {
                    20 * (99 - static_rate)
                };
                self.static_count = ((count as i64 * self.sr_multiplier) >> 24) as i32;
            } else {
                self.static_count = 0;
            }

            self.inc = (4 + (qrate & 3)) << (8 + (qrate >> 2));
            self.inc = ((self.inc as i64 * self.sr_multiplier) >> 24) as i32;
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn stage(&self) -> usize {
        self.ix
    }

    pub fn is_down(&self) -> bool {
        self.down
    }
}
