use crate::audio::AudioBackend;
use crate::runtime::NativeOsc;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use std::sync::{Arc, Mutex};

pub struct CpalBackend {
    stream: Option<Stream>,
    osc: Arc<Mutex<NativeOsc>>,
}

impl CpalBackend {
    pub fn new(osc: Arc<Mutex<NativeOsc>>) -> Self {
        Self { stream: None, osc }
    }

    fn select_output_device(
        &self,
        host: &cpal::Host,
    ) -> Result<cpal::Device, Box<dyn std::error::Error>> {
        if cfg!(target_os = "linux") {
            self.select_linux_output_device(host)
        } else {
            host.default_output_device()
                .ok_or_else(|| "No output device available".into())
        }
    }

    fn select_linux_output_device(
        &self,
        host: &cpal::Host,
    ) -> Result<cpal::Device, Box<dyn std::error::Error>> {
        let mut device_names = Vec::new();

        for device in host.devices()? {
            let name = device.name().unwrap_or_default();
            if name.to_lowercase().starts_with("default:")
                || name.to_lowercase().contains("pipewire")
            {
                device_names.push(name);
            }
        }

        if device_names.is_empty() {
            return host
                .default_output_device()
                .ok_or_else(|| "No output device available".into());
        }

        println!("Available output devices:");
        for (i, name) in device_names.iter().enumerate() {
            println!("{}. {}", i + 1, name);
        }

        println!("Select device (default 1): ");
        let mut choice = String::new();
        std::io::stdin().read_line(&mut choice)?;
        let choice = choice
            .trim()
            .parse::<usize>()
            .unwrap_or(1)
            .saturating_sub(1);

        let selected_name = device_names.get(choice).ok_or("Invalid device selection")?;

        host.devices()?
            .find(|d| d.name().map(|n| n == *selected_name).unwrap_or(false))
            .ok_or_else(|| "Selected output device not found".into())
    }

    fn build_stream(&mut self) -> Result<Stream, Box<dyn std::error::Error>> {
        let host = cpal::default_host();
        let device = self.select_output_device(&host)?;
        println!("Selected device: {}", device.name().unwrap_or_default());

        let supported_config = device.default_output_config()?;
        let mut stream_config: cpal::StreamConfig = supported_config.clone().into();
        stream_config.buffer_size = cpal::BufferSize::Fixed(256);

        let sample_rate = stream_config.sample_rate.0 as f32;
        let channels = stream_config.channels as usize;
        let osc = self.osc.clone();
        let mut mono = Vec::new();

        let stream = match supported_config.sample_format() {
            SampleFormat::F32 => device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    mono.resize(data.len() / channels, 0.0);
                    {
                        let mut osc = osc.lock().unwrap();
                        osc.process(&mut mono, sample_rate);
                    }
                    for (frame, &sample) in data.chunks_mut(channels).zip(mono.iter()) {
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| eprintln!("Stream error: {}", err),
                None,
            )?,
            _ => return Err("Unsupported sample format".into()),
        };

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) {
        match self.build_stream() {
            Ok(stream) => {
                stream.play().expect("Failed to start stream");
                self.stream = Some(stream);
            }
            Err(e) => eprintln!("Failed to open audio output: {}", e),
        }
    }

    fn stop(&mut self) {
        if let Some(stream) = &self.stream {
            stream.pause().expect("Failed to stop stream");
        }
    }
}
