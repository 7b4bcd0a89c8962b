//! Event types carried from the demo host's input threads to the audio
//! thread. The engine itself never sees these; they are translated into
//! trait calls at block boundaries.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteSource {
    Keyboard,
    Midi,
}

#[derive(Clone, Copy, Debug)]
pub struct NoteEvent {
    pub note: u8,
    pub velocity: u8,
    pub is_on: bool,
    pub source: NoteSource,
}

impl NoteEvent {
    pub fn new(note: u8, velocity: u8, is_on: bool, source: NoteSource) -> Result<Self, String> {
        if note > 127 {
            return Err(format!("Note number {} out of MIDI range", note));
        }
        if velocity > 127 {
            return Err(format!("Velocity {} out of MIDI range", velocity));
        }
        Ok(Self {
            note,
            velocity,
            is_on,
            source,
        })
    }
}

/// Raw host parameter change, forwarded verbatim to the active oscillator.
#[derive(Clone, Copy, Debug)]
pub struct ParamEvent {
    pub index: u16,
    pub value: u16,
}

#[derive(Clone, Copy, Debug)]
pub enum CycleDirection {
    Forward,
    Backward,
}

/// Demo-host control surface: raw parameter changes, patch stepping, and
/// engine/mode switching.
#[derive(Clone, Copy, Debug)]
pub enum ControlEvent {
    Param(ParamEvent),
    CyclePatch { direction: CycleDirection },
    ToggleEngine,
    ToggleDuophonic,
}
