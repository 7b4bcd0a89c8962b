use crate::osc::log_env::LogEnv;
use crate::osc::prelude::{clip_minmax, note_hz, param_to_f32, w0_for_note};
use crate::osc::waveform::Waveform;
use crate::osc::{
    Oscillator, PARAM_ID1, PARAM_ID2, PARAM_ID3, PARAM_ID4, PARAM_ID5, PARAM_ID6, PARAM_SHAPE,
    PARAM_SHIFT_SHAPE,
};

const Q24_RECIP: f32 = 0.000_000_06;
const Q24_ONE: f32 = 16_777_216.0;

/// Two-operator phase-modulation voice: a carrier and a modulator with a
/// serial/parallel routing toggle, a shift-scaled two-sample feedback loop on
/// the modulator, and a Q8.24 log-level envelope gating the modulator.
///
/// Parameter changes that touch the envelope or feedback only mark a refresh
/// flag; the refresh is applied at the top of the next block so a knob can
/// never tear state mid-block.
pub struct PmVoice {
    note: u8,
    fine: u8,
    /// Note the carrier is pinned to while duophonic pitch-hold is active.
    init_note: u8,

    phi0: f32,
    phi1: f32,
    w0: f32,
    w1: f32,

    coar1: i32,
    coar2: i32,
    detune_knob: f32,
    func_select: u16,

    car_shape: Waveform,
    mod_shape: Waveform,
    route_serial: bool,

    duophonic: bool,
    hold_car_pitch: bool,
    coar_change_car: bool,

    env: LogEnv,
    old_level: i32,
    fb_buffer: [i32; 2],
    fb_shift: u32,
    feedback: i32,

    refresh_env: bool,
    reset_flag: bool,

    lfo: f32,
    lfoz: f32,

    sample_rate: f32,
    sample_rate_recip: f32,
}

impl PmVoice {
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        let sample_rate_recip = 1.0 / sample_rate;
        Self {
            note: 69,
            fine: 0,
            init_note: 69,
            phi0: 0.0,
            phi1: 0.0,
            w0: 440.0 * sample_rate_recip,
            w1: 440.0 * sample_rate_recip,
            coar1: 1,
            coar2: 1,
            detune_knob: 0.0,
            func_select: 0,
            car_shape: Waveform::Sine,
            mod_shape: Waveform::Sine,
            route_serial: true,
            duophonic: false,
            hold_car_pitch: false,
            coar_change_car: false,
            env: LogEnv::new(sample_rate as f64),
            old_level: 0,
            fb_buffer: [0, 0],
            fb_shift: 16,
            feedback: 0,
            refresh_env: false,
            reset_flag: false,
            lfo: 0.0,
            lfoz: 0.0,
            sample_rate,
            sample_rate_recip,
        }
    }

    /// Host LFO input, applied as a per-block smoothed modulator-level dip.
    pub fn set_shape_lfo(&mut self, lfo: f32) {
        self.lfo = lfo;
    }

    /// Enable the two-pitch mode. The carrier starts on the current note and
    /// is re-pinned by the note-off/note-on hold sequence from then on.
    pub fn set_duophonic(&mut self, enabled: bool) {
        self.duophonic = enabled;
        self.hold_car_pitch = false;
        self.init_note = self.note;
        self.coar_change_car = enabled;
    }

    pub fn is_duophonic(&self) -> bool {
        self.duophonic
    }

    pub fn envelope(&self) -> &LogEnv {
        &self.env
    }

    /// Carrier phase increment, for hosts inspecting the held pitch.
    pub fn carrier_w(&self) -> f32 {
        self.w0
    }

    pub fn modulator_w(&self) -> f32 {
        self.w1
    }

    /// Block-top pitch refresh. Duophonic mode keeps the carrier pinned to
    /// `init_note` (12-semitone coarse steps) and lets the modulator track
    /// the live note; monophonic mode moves both (6-semitone coarse steps).
    fn refresh_pitch(&mut self) {
        if self.duophonic {
            self.w1 = w0_for_note(
                self.note as i32 + 12 * self.coar2,
                self.fine,
                self.sample_rate_recip,
            );
            if self.coar_change_car {
                self.w0 = w0_for_note(
                    self.init_note as i32 + 12 * self.coar1,
                    self.fine,
                    self.sample_rate_recip,
                );
                self.coar_change_car = false;
            }
        } else {
            self.w0 = w0_for_note(
                self.note as i32 + 6 * self.coar1,
                self.fine,
                self.sample_rate_recip,
            );
            self.w1 = w0_for_note(
                self.note as i32 + 6 * self.coar2,
                self.fine,
                self.sample_rate_recip,
            );
        }
    }
}

impl Oscillator for PmVoice {
    fn init(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.sample_rate_recip = 1.0 / self.sample_rate;
        self.phi0 = 0.0;
        self.phi1 = 0.0;
        self.fb_buffer = [0, 0];
        self.old_level = 0;
        self.env.init_sr(self.sample_rate as f64);
        self.env.trigger();
        self.refresh_pitch();
    }

    fn note_on(&mut self, note: u8, fine: u8) {
        self.note = note.min(127);
        self.fine = fine;
        self.reset_flag = true;
        self.env.trigger();

        if self.duophonic {
            if self.hold_car_pitch {
                // The carrier stays on the pitch released last; only the
                // modulator follows this note.
                self.hold_car_pitch = false;
            } else {
                self.init_note = self.note;
                self.coar_change_car = true;
            }
        } else {
            self.init_note = self.note;
        }
    }

    fn note_off(&mut self, _note: u8) {
        self.env.keydown(false);
        if self.duophonic {
            self.hold_car_pitch = true;
        }
    }

    fn set_param(&mut self, index: u16, value: u16) {
        match index {
            // Carrier coarse tune. -2 puts the lowest setting an octave down.
            PARAM_ID1 => {
                self.coar1 = value as i32 - 2;
                self.coar_change_car = true;
            }
            // Modulator coarse tune.
            PARAM_ID2 => {
                self.coar2 = value as i32 - 2;
            }
            // Feedback amount, 0-7.
            PARAM_ID3 => {
                self.feedback = (value as i32).clamp(0, 7);
                self.refresh_env = true;
            }
            // Combined carrier/modulator wave-shape index, 0-15.
            PARAM_ID4 => {
                let (car, modulator) = Waveform::decode_pair(value.min(15));
                self.car_shape = car;
                self.mod_shape = modulator;
            }
            // Multi-function knob, routed by the function select below.
            PARAM_ID5 => {
                let raw = value as i32;
                match self.func_select {
                    0 => self.env.attack_rate = raw,
                    1 => self.env.decay_rate = raw,
                    2 => self.env.attack_level = raw,
                    3 => self.env.decay_level = raw,
                    4 => self.env.release_rate = raw,
                    _ => {}
                }
                self.refresh_env = true;

                if self.func_select == 5 {
                    self.route_serial = value > 50;
                }
            }
            // Function select for the knob above.
            PARAM_ID6 => {
                self.func_select = value;
            }
            // Modulator output level, expressed through the envelope ceiling.
            PARAM_SHAPE => {
                self.env.max_env_val = (param_to_f32(value as i32) * 100.0) as i32;
                self.refresh_env = true;
            }
            // Carrier detune depth, decoded to -15..+16.
            PARAM_SHIFT_SHAPE => {
                self.detune_knob = (value >> 5) as f32 - 15.0;
            }
            _ => {}
        }
    }

    fn render(&mut self, output: &mut [f32]) {
        if output.is_empty() {
            return;
        }
        let frames = output.len() as i32;

        self.refresh_pitch();

        if self.reset_flag {
            self.phi0 = 0.0;
            self.phi1 = 0.0;
            self.reset_flag = false;
        }

        if self.refresh_env {
            self.env.update();
            self.fb_shift = if self.feedback != 0 {
                (8 - self.feedback) as u32
            } else {
                16
            };
            self.refresh_env = false;
        }

        // The envelope runs at block rate; the resulting gain is converted
        // out of the log2 domain and interpolated linearly across the block.
        let gain1 = self.old_level;
        let env_out = self.env.sample(frames);
        let env_f = env_out as f32 * Q24_RECIP;
        let gain2 = ((env_f - 14.0).exp2() * Q24_ONE) as i32;
        self.old_level = gain2;
        let dgain = (gain2 - gain1 + frames / 2) / frames;
        let mut gain = gain1;

        let mut y0 = self.fb_buffer[0];
        let mut y1 = self.fb_buffer[1];

        let mut phi0 = self.phi0;
        let mut phi1 = self.phi1;

        // The detune knob tops out near 10 Hz at the highest note setting.
        let freq_hz = note_hz(self.note as f32);
        let detune_ratio = (0.000051728_f64 * freq_hz as f64) / 15.0;
        let det = (detune_ratio * freq_hz as f64 * self.detune_knob as f64) as f32
            * self.sample_rate_recip;

        let mut lfoz = self.lfoz;
        let lfo_inc = (self.lfo - lfoz) / output.len() as f32;

        for sample in output.iter_mut() {
            gain += dgain;
            let gainf = Q24_RECIP * gain as f32;

            let scaled_fb = (y0 + y1) >> (self.fb_shift + 1);
            y0 = y1;
            let scaled_fbf = scaled_fb as f32 * Q24_RECIP;

            let lfo_mix = clip_minmax(0.005, 1.0 - lfoz, 0.995);
            let mod_out = self.mod_shape.evaluate(phi1 + scaled_fbf) * (gainf * lfo_mix);
            y1 = (mod_out * Q24_ONE) as i32;

            let sig = if self.route_serial {
                0.25 * self.car_shape.evaluate(phi0 + mod_out)
            } else {
                0.25 * self.car_shape.evaluate(phi0)
                    + 0.25 * (self.mod_shape.evaluate(phi1) * mod_out)
            };

            *sample = sig;

            phi0 += self.w0 + det;
            phi0 -= phi0.floor();
            phi1 += self.w1;
            phi1 -= phi1.floor();
            lfoz += lfo_inc;
        }

        self.fb_buffer = [y0, y1];
        self.phi0 = phi0;
        self.phi1 = phi1;
        self.lfoz = lfoz;
    }
}
