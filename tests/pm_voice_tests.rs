use rustfmosc::osc::prelude::w0_for_note;
use rustfmosc::osc::{
    Oscillator, PmVoice, PARAM_ID1, PARAM_ID2, PARAM_ID3, PARAM_ID5, PARAM_ID6, PARAM_SHAPE,
};

const SAMPLE_RATE: f32 = 48_000.0;

/// A voice with both coarse knobs at unison and the modulator level opened.
fn open_voice() -> PmVoice {
    let mut voice = PmVoice::new(SAMPLE_RATE);
    voice.set_param(PARAM_ID1, 2); // carrier coarse 0
    voice.set_param(PARAM_ID2, 2); // modulator coarse 0
    voice.set_param(PARAM_SHAPE, 1023);
    voice
}

fn render(voice: &mut PmVoice, frames: usize) -> Vec<f32> {
    let mut block = vec![0.0; frames];
    voice.render(&mut block);
    block
}

#[test]
fn duophonic_holds_the_released_pitch_on_the_carrier() {
    let mut voice = open_voice();
    voice.set_duophonic(true);

    // Note A on, A off (arms the hold), note B on.
    voice.note_on(57, 0);
    render(&mut voice, 64);
    voice.note_off(57);
    render(&mut voice, 64);
    voice.note_on(69, 0);
    render(&mut voice, 64);

    let recip = 1.0 / SAMPLE_RATE;
    assert_eq!(
        voice.carrier_w(),
        w0_for_note(57, 0, recip),
        "carrier must keep the released note"
    );
    assert_eq!(
        voice.modulator_w(),
        w0_for_note(69, 0, recip),
        "modulator must follow the new note"
    );
}

#[test]
fn duophonic_without_a_pending_hold_moves_both_operators() {
    let mut voice = open_voice();
    voice.set_duophonic(true);

    // Legato overlap: no note-off in between, so the carrier follows too.
    voice.note_on(57, 0);
    render(&mut voice, 64);
    voice.note_on(69, 0);
    render(&mut voice, 64);

    let recip = 1.0 / SAMPLE_RATE;
    assert_eq!(voice.carrier_w(), w0_for_note(69, 0, recip));
    assert_eq!(voice.modulator_w(), w0_for_note(69, 0, recip));
}

#[test]
fn monophonic_mode_tracks_every_note_on_both_operators() {
    let mut voice = open_voice();
    voice.note_on(57, 0);
    render(&mut voice, 64);
    voice.note_off(57);
    voice.note_on(69, 0);
    render(&mut voice, 64);

    let recip = 1.0 / SAMPLE_RATE;
    assert_eq!(voice.carrier_w(), w0_for_note(69, 0, recip));
    assert_eq!(voice.modulator_w(), w0_for_note(69, 0, recip));
}

#[test]
fn rendering_is_deterministic_for_identical_parameter_history() {
    let run = || {
        let mut voice = open_voice();
        voice.set_param(PARAM_ID3, 5);
        voice.set_shape_lfo(0.25);
        voice.note_on(60, 0);
        let mut all = render(&mut voice, 256);
        all.extend(render(&mut voice, 256));
        voice.note_off(60);
        all.extend(render(&mut voice, 256));
        all
    };

    let first = run();
    let second = run();
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.to_bits(), b.to_bits(), "output must be bit-identical");
    }
    assert!(first.iter().any(|&s| s != 0.0));
}

#[test]
fn serial_and_parallel_routing_differ() {
    let mut serial = open_voice();
    let mut parallel = open_voice();

    for voice in [&mut serial, &mut parallel] {
        voice.set_param(PARAM_ID6, 5);
    }
    serial.set_param(PARAM_ID5, 100);
    parallel.set_param(PARAM_ID5, 0);

    serial.note_on(60, 0);
    parallel.note_on(60, 0);
    let a = render(&mut serial, 2048);
    let b = render(&mut parallel, 2048);
    assert!(
        a.iter().zip(b.iter()).any(|(x, y)| x != y),
        "routing toggle must change the signal"
    );
}

#[test]
fn zero_feedback_knob_disables_the_feedback_path() {
    // Feedback 0 maps to a 16-bit shift: the two-sample loop contributes
    // nothing, so the output matches a voice that never touched the knob.
    let mut touched = open_voice();
    let mut untouched = open_voice();
    touched.set_param(PARAM_ID3, 0);

    touched.note_on(60, 0);
    untouched.note_on(60, 0);
    let a = render(&mut touched, 1024);
    let b = render(&mut untouched, 1024);
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }

    // A hot feedback knob must audibly change the modulator.
    let mut hot = open_voice();
    hot.set_param(PARAM_ID3, 7);
    hot.note_on(60, 0);
    let c = render(&mut hot, 1024);
    assert!(a.iter().zip(c.iter()).any(|(x, y)| x != y));
}

#[test]
fn envelope_knobs_route_through_the_function_select() {
    let mut voice = open_voice();

    // Select "decay rate" and set it; the envelope must pick it up on the
    // next block, not immediately.
    voice.set_param(PARAM_ID6, 1);
    voice.set_param(PARAM_ID5, 35);
    assert_eq!(voice.envelope().decay_rate, 35);

    voice.note_on(60, 0);
    render(&mut voice, 64);
    voice.note_off(60);
    render(&mut voice, 4096);

    // After release runs out the envelope parks in its terminal stage.
    for _ in 0..64 {
        render(&mut voice, 256);
    }
    assert_eq!(voice.envelope().stage(), 4);
}

#[test]
fn out_of_range_parameters_are_ignored() {
    let mut with_noise = open_voice();
    let mut plain = open_voice();
    with_noise.set_param(999, 3);
    with_noise.set_param(42, 1000);

    with_noise.note_on(60, 0);
    plain.note_on(60, 0);
    let a = render(&mut with_noise, 512);
    let b = render(&mut plain, 512);
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}
