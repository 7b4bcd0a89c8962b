use crate::osc::note::{ControlEvent, CycleDirection, NoteEvent, NoteSource};
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::collections::HashMap;
use std::sync::mpsc::Sender;

pub struct KeyboardHandler {
    device_state: DeviceState,
    key_states: HashMap<Keycode, bool>,
    key_to_note: HashMap<Keycode, u8>,
    control_states: HashMap<Keycode, bool>,
    note_sender: Sender<NoteEvent>,
    control_sender: Sender<ControlEvent>,
}

// Control keys live outside the playing rows:
//   Z/X step the FM patch, C toggles the engine, V toggles duophonic mode.
const CONTROL_KEYS: [Keycode; 4] = [Keycode::Z, Keycode::X, Keycode::C, Keycode::V];

impl KeyboardHandler {
    pub fn new(note_sender: Sender<NoteEvent>, control_sender: Sender<ControlEvent>) -> Self {
        let device_state = DeviceState::new();
        let mut key_states: HashMap<Keycode, bool> = HashMap::new();
        let mut control_states: HashMap<Keycode, bool> = HashMap::new();

        // Home row plays naturals from A3, top row the sharps/flats.
        let key_to_note: HashMap<Keycode, u8> = [
            (Keycode::A, 57),
            (Keycode::S, 59),
            (Keycode::D, 60),
            (Keycode::F, 62),
            (Keycode::G, 64),
            (Keycode::H, 65),
            (Keycode::J, 67),
            (Keycode::K, 69),
            (Keycode::L, 71),
            (Keycode::Semicolon, 72),
            (Keycode::W, 58),
            (Keycode::R, 61),
            (Keycode::T, 63),
            (Keycode::U, 66),
            (Keycode::I, 68),
            (Keycode::O, 70),
            (Keycode::LeftBracket, 73),
        ]
        .iter()
        .cloned()
        .collect();

        for key in key_to_note.keys() {
            key_states.insert(*key, false);
        }
        for key in CONTROL_KEYS.iter() {
            control_states.insert(*key, false);
        }

        Self {
            device_state,
            key_states,
            key_to_note,
            control_states,
            note_sender,
            control_sender,
        }
    }

    pub fn update(&mut self) {
        let keys: Vec<Keycode> = self.device_state.get_keys();

        for (key, note) in &self.key_to_note {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states.get(key).cloned().unwrap_or(false);

            if is_pressed != was_pressed {
                let event = if is_pressed {
                    NoteEvent::new(*note, 100, true, NoteSource::Keyboard)
                } else {
                    NoteEvent::new(*note, 0, false, NoteSource::Keyboard)
                };
                if let Ok(event) = event {
                    if let Err(e) = self.note_sender.send(event) {
                        eprintln!("Error sending note event: {}", e);
                    }
                }
                self.key_states.insert(*key, is_pressed);
            }
        }

        for key in CONTROL_KEYS.iter() {
            let is_pressed = keys.contains(key);
            let was_pressed = self.control_states.get(key).cloned().unwrap_or(false);

            if is_pressed && !was_pressed {
                let event = match key {
                    Keycode::Z => ControlEvent::CyclePatch {
                        direction: CycleDirection::Backward,
                    },
                    Keycode::X => ControlEvent::CyclePatch {
                        direction: CycleDirection::Forward,
                    },
                    Keycode::C => ControlEvent::ToggleEngine,
                    Keycode::V => ControlEvent::ToggleDuophonic,
                    _ => continue,
                };
                if let Err(e) = self.control_sender.send(event) {
                    eprintln!("Error sending control event: {}", e);
                }
            }

            self.control_states.insert(*key, is_pressed);
        }
    }
}
