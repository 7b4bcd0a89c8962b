use crate::osc::note::{ControlEvent, NoteEvent, NoteSource, ParamEvent};
use crate::osc::{PARAM_ID2, PARAM_SHAPE};
use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use std::error::Error;
use std::io::{stdin, stdout, Write};
use std::sync::mpsc::Sender;
use std::sync::mpsc::{self, Receiver};

pub struct MidiHandler {
    /// Holds the connection to keep it alive
    #[allow(dead_code)]
    connection: Option<MidiInputConnection<()>>,
    receiver: Option<Receiver<(u8, u8, u8)>>, // (status, data1, data2)
    note_sender: Sender<NoteEvent>,
    control_sender: Sender<ControlEvent>,
}

impl MidiHandler {
    pub fn new(note_sender: Sender<NoteEvent>, control_sender: Sender<ControlEvent>) -> Self {
        match Self::try_new(note_sender.clone(), control_sender.clone()) {
            Ok(handler) => handler,
            Err(e) => {
                println!(
                    "Failed to initialize MIDI: {}. MIDI functionality will be disabled.",
                    e
                );
                Self {
                    connection: None,
                    receiver: None,
                    note_sender,
                    control_sender,
                }
            }
        }
    }

    fn try_new(
        note_sender: Sender<NoteEvent>,
        control_sender: Sender<ControlEvent>,
    ) -> Result<Self, Box<dyn Error>> {
        let midi_in = MidiInput::new("rustfmosc input")?;
        let port = Self::select_input_port(&midi_in)?;
        let port_name = midi_in.port_name(&port)?;

        let (sender, receiver) = mpsc::channel();

        let connection = midi_in.connect(
            &port,
            "midir-read-input",
            move |_, message, _| {
                if message.len() >= 2 {
                    let data2 = if message.len() >= 3 { message[2] } else { 0 };
                    let _ = sender.send((message[0], message[1], data2));
                }
            },
            (),
        )?;

        println!("Opened MIDI port: {}", port_name);

        Ok(Self {
            connection: Some(connection),
            receiver: Some(receiver),
            note_sender,
            control_sender,
        })
    }

    fn select_input_port(midi_in: &MidiInput) -> Result<MidiInputPort, Box<dyn Error>> {
        let in_ports = midi_in.ports();
        if in_ports.is_empty() {
            return Err("No MIDI input ports found".into());
        }

        println!("Available MIDI input ports:");
        for (i, port) in in_ports.iter().enumerate() {
            println!("{}: {}", i, midi_in.port_name(port)?);
        }

        print!("Select MIDI input port: ");
        stdout().flush()?;
        let mut input = String::new();
        stdin().read_line(&mut input)?;
        let selection = input.trim().parse::<usize>().unwrap_or(0);

        let port = in_ports
            .get(selection)
            .ok_or("Invalid MIDI port selection")?
            .clone();

        Ok(port)
    }

    pub fn update(&mut self) {
        if let Some(receiver) = &self.receiver {
            while let Ok((status, data1, data2)) = receiver.try_recv() {
                match status & 0xF0 {
                    0x90 if data2 > 0 => {
                        if let Ok(event) = NoteEvent::new(data1, data2, true, NoteSource::Midi) {
                            if let Err(e) = self.note_sender.send(event) {
                                eprintln!("Failed to send MIDI NoteEvent: {}", e);
                            }
                        }
                    }
                    0x80 | 0x90 => {
                        if let Ok(event) = NoteEvent::new(data1, 0, false, NoteSource::Midi) {
                            if let Err(e) = self.note_sender.send(event) {
                                eprintln!("Failed to send MIDI NoteEvent: {}", e);
                            }
                        }
                    }
                    // Mod wheel drives the shape knob (10-bit host domain).
                    0xB0 if data1 == 1 => {
                        let event = ControlEvent::Param(ParamEvent {
                            index: PARAM_SHAPE,
                            value: (data2 as u16) * 8,
                        });
                        if let Err(e) = self.control_sender.send(event) {
                            eprintln!("Failed to send MIDI control event: {}", e);
                        }
                    }
                    // Program change selects an FM patch directly.
                    0xC0 => {
                        let event = ControlEvent::Param(ParamEvent {
                            index: PARAM_ID2,
                            value: data1 as u16,
                        });
                        if let Err(e) = self.control_sender.send(event) {
                            eprintln!("Failed to send MIDI control event: {}", e);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
