use crate::osc::scaling::{rate_to_frames, scale_level, scale_rate};

/// The five envelope segments. `Sustain` and `Release` are absorbing: their
/// successor is themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    Attack,
    Decay,
    Decay2,
    Sustain,
    Release,
}

pub const NUM_STEPS: usize = 5;

impl StepId {
    pub fn next(self) -> StepId {
        match self {
            StepId::Attack => StepId::Decay,
            StepId::Decay => StepId::Decay2,
            StepId::Decay2 => StepId::Sustain,
            StepId::Sustain => StepId::Sustain,
            StepId::Release => StepId::Release,
        }
    }

    fn index(self) -> usize {
        match self {
            StepId::Attack => 0,
            StepId::Decay => 1,
            StepId::Decay2 => 2,
            StepId::Sustain => 3,
            StepId::Release => 4,
        }
    }
}

/// One segment: duration in samples, per-sample multiplicative delta, and the
/// level endpoints. Recomputed on patch changes, fixed during playback.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeStep {
    pub num_frames: f32,
    pub dl_df: f32,
    pub start_level: f32,
    pub end_level: f32,
}

impl EnvelopeStep {
    fn is_ascending(&self) -> bool {
        self.start_level < self.end_level
    }
}

fn nearly(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

#[derive(Debug, Clone)]
pub struct Envelope {
    steps: [EnvelopeStep; NUM_STEPS],
    current: StepId,
    frame: f32,
    level: f32,
}

impl Envelope {
    pub fn new() -> Self {
        let mut env = Self {
            steps: [EnvelopeStep::default(); NUM_STEPS],
            current: StepId::Attack,
            frame: 0.0,
            level: 0.0,
        };
        env.reset();
        env
    }

    pub fn reset(&mut self) {
        self.steps = [EnvelopeStep::default(); NUM_STEPS];
        self.go_to(StepId::Attack);
    }

    fn go_to(&mut self, step: StepId) {
        self.frame = 0.0;
        self.current = step;
        self.level = self.steps[step.index()].start_level;
    }

    pub fn note_on(&mut self) {
        self.go_to(StepId::Attack);
    }

    pub fn note_off(&mut self) {
        self.go_to(StepId::Release);
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn current_step(&self) -> StepId {
        self.current
    }

    /// Advance by one sample. Three independent conditions can end a segment
    /// (frame count elapsed, convergence within 0.001, directional overshoot);
    /// whichever fires first wins. The release segment never auto-advances,
    /// and the level is deliberately NOT snapped to the next segment's start.
    fn increment_frame(&mut self) {
        self.frame += 1.0;

        let tiny = 0.0001;
        if self.level < tiny {
            self.level = tiny;
        }

        let step = self.steps[self.current.index()];
        self.level *= step.dl_df;

        let mut advance = false;
        if self.frame >= step.num_frames {
            advance = true;
        }
        if nearly(self.level, step.end_level, 0.001) {
            advance = true;
        }
        if step.is_ascending() {
            if self.level > step.end_level {
                advance = true;
            }
        } else if self.level < step.end_level {
            advance = true;
        }

        if advance && self.current != StepId::Release {
            self.frame = 0.0;
            self.current = self.current.next();
        }
    }

    /// Emit the pre-advance level: the caller sees the level *before* this
    /// sample's update, a one-sample delay that is part of the contract.
    pub fn next_level(&mut self) -> f32 {
        let out = self.level;
        self.increment_frame();
        out
    }

    /// Build all five segments from the four (rate, level) parameter pairs.
    /// The level chain runs l1 -> l2 -> l3 (sustain); release always targets 0
    /// regardless of l4, and attack always starts from silence.
    pub fn set_dx7(&mut self, rates: [u8; 4], levels: [u8; 4], sample_rate: f32) {
        self.reset();

        let l1 = scale_level(levels[0] as f32);
        let l2 = scale_level(levels[1] as f32);
        let l3 = scale_level(levels[2] as f32);

        let [attack, decay, decay2, sustain, release] = &mut self.steps;
        attack.start_level = 0.0;
        attack.end_level = l1;
        decay.start_level = l1;
        decay.end_level = l2;
        decay2.start_level = l2;
        decay2.end_level = l3;
        sustain.start_level = l3;
        sustain.end_level = l3;
        release.start_level = l3;
        release.end_level = 0.0;

        attack.dl_df = scale_rate(rates[0] as f32, attack.start_level, attack.end_level);
        decay.dl_df = scale_rate(rates[1] as f32, decay.start_level, decay.end_level);
        decay2.dl_df = scale_rate(rates[2] as f32, decay2.start_level, decay2.end_level);
        sustain.dl_df = 1.0;
        release.dl_df = scale_rate(rates[3] as f32, release.start_level, release.end_level);

        attack.num_frames = rate_to_frames(rates[0] as f32, sample_rate);
        decay.num_frames = rate_to_frames(rates[1] as f32, sample_rate);
        decay2.num_frames = rate_to_frames(rates[2] as f32, sample_rate);
        sustain.num_frames = 1.0;
        release.num_frames = rate_to_frames(rates[3] as f32, sample_rate);

        self.go_to(StepId::Attack);
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
