use crate::audio::{AudioBackend, CpalBackend};
use crate::input::{KeyboardHandler, MidiHandler};
use crate::osc::note::{ControlEvent, CycleDirection, NoteEvent};
use crate::osc::patch::PATCHES;
use crate::osc::{FmVoice, Oscillator, PmVoice, PARAM_ID2};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Engine {
    Fm,
    Pm,
}

/// Native demo runtime: owns one FM voice and one phase-modulation voice,
/// drains note/control events at block boundaries, and renders whichever
/// engine is active. One instance is one oscillator slot.
pub struct NativeOsc {
    fm: FmVoice,
    pm: PmVoice,
    engine: Engine,
    current_note: Option<u8>,
    patch_index: usize,
    sample_rate: f32,
    note_receiver: Receiver<NoteEvent>,
    control_receiver: Receiver<ControlEvent>,
}

impl NativeOsc {
    pub fn new(note_receiver: Receiver<NoteEvent>, control_receiver: Receiver<ControlEvent>) -> Self {
        let sample_rate = 44_100.0;
        Self {
            fm: FmVoice::new(sample_rate),
            pm: PmVoice::new(sample_rate),
            engine: Engine::Fm,
            current_note: None,
            patch_index: 0,
            sample_rate,
            note_receiver,
            control_receiver,
        }
    }

    pub fn process(&mut self, output: &mut [f32], sample_rate: f32) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.fm.init(sample_rate);
            self.pm.init(sample_rate);
        }

        self.process_note_events();
        self.process_control_events();

        match self.engine {
            Engine::Fm => self.fm.render(output),
            Engine::Pm => self.pm.render(output),
        }
    }

    fn active(&mut self) -> &mut dyn Oscillator {
        match self.engine {
            Engine::Fm => &mut self.fm,
            Engine::Pm => &mut self.pm,
        }
    }

    fn process_note_events(&mut self) {
        while let Ok(event) = self.note_receiver.try_recv() {
            if event.is_on {
                self.current_note = Some(event.note);
                self.active().note_on(event.note, 0);
            } else if self.current_note == Some(event.note) {
                // Stale note-offs from superseded keys are ignored; the
                // voices are monophonic with last-note priority.
                self.current_note = None;
                self.active().note_off(event.note);
            }
        }
    }

    fn process_control_events(&mut self) {
        while let Ok(event) = self.control_receiver.try_recv() {
            match event {
                ControlEvent::Param(param) => {
                    self.active().set_param(param.index, param.value);
                }
                ControlEvent::CyclePatch { direction } => {
                    let count = PATCHES.len();
                    self.patch_index = match direction {
                        CycleDirection::Forward => (self.patch_index + 1) % count,
                        CycleDirection::Backward => (self.patch_index + count - 1) % count,
                    };
                    self.fm.set_param(PARAM_ID2, self.patch_index as u16);
                    println!(
                        "Patch {}: {}",
                        self.patch_index, PATCHES[self.patch_index].name
                    );
                }
                ControlEvent::ToggleEngine => {
                    if let Some(note) = self.current_note.take() {
                        self.active().note_off(note);
                    }
                    self.engine = match self.engine {
                        Engine::Fm => Engine::Pm,
                        Engine::Pm => Engine::Fm,
                    };
                    println!("Engine: {:?}", self.engine);
                }
                ControlEvent::ToggleDuophonic => {
                    let enabled = !self.pm.is_duophonic();
                    self.pm.set_duophonic(enabled);
                    println!("Duophonic: {}", enabled);
                }
            }
        }
    }
}

pub fn start() {
    let (note_tx, note_rx) = channel();
    let (control_tx, control_rx) = channel();

    let osc = Arc::new(Mutex::new(NativeOsc::new(note_rx, control_rx)));

    let mut audio_backend = CpalBackend::new(osc.clone());
    audio_backend.start();

    let mut keyboard_handler = KeyboardHandler::new(note_tx.clone(), control_tx.clone());
    let mut midi_handler = MidiHandler::new(note_tx, control_tx);

    loop {
        keyboard_handler.update();
        midi_handler.update();
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}
