use rustfmosc::osc::envelope::{Envelope, StepId};
use rustfmosc::osc::scaling::{rate_to_frames, scale_rate, RATES};

const SAMPLE_RATE: f32 = 48_000.0;

#[test]
fn rate_table_is_monotonic() {
    // Higher raw rate means a faster segment: smaller decay constant and a
    // shorter frame budget.
    for raw in 0..99 {
        assert!(
            RATES[raw] > RATES[raw + 1],
            "rate constant not decreasing at {}",
            raw
        );
        assert!(
            rate_to_frames(raw as f32, SAMPLE_RATE) > rate_to_frames(raw as f32 + 1.0, SAMPLE_RATE),
            "frame budget not decreasing at {}",
            raw
        );
    }
}

#[test]
fn scale_rate_direction() {
    for raw in 0..=99 {
        let descending = scale_rate(raw as f32, 1.0, 0.0);
        let ascending = scale_rate(raw as f32, 0.0, 1.0);
        assert!(descending < 1.0, "descending constant must shrink the level");
        assert!(ascending > 1.0, "ascending constant must grow the level");
        assert!((descending * ascending - 1.0).abs() < 1e-6);
    }
}

#[test]
fn fast_attack_reaches_peak_within_frame_budget() {
    let mut env = Envelope::new();
    env.set_dx7([99, 99, 99, 99], [99, 99, 0, 0], SAMPLE_RATE);
    env.note_on();

    let budget = rate_to_frames(99.0, SAMPLE_RATE) as usize;
    let mut peak: f32 = 0.0;
    for _ in 0..budget {
        peak = peak.max(env.next_level());
    }

    // The attack must have touched the scaled level of 99 (1.0). A single
    // overshoot sample may exceed it by at most one attack multiplier.
    assert!(peak >= 0.99, "peak {} never reached the target", peak);
    assert!(peak <= 1.0 * scale_rate(99.0, 0.0, 1.0) + 1e-6);

    // With the sustain level at 0, the tail of the budget decays back down.
    env.note_off();
    let mut level = env.next_level();
    for _ in 0..budget {
        level = env.next_level();
    }
    assert!(level < 0.01, "release did not decay toward 0, level {}", level);
    assert!(level >= 0.0);
}

#[test]
fn note_off_immediately_after_note_on_is_legal() {
    let mut env = Envelope::new();
    env.set_dx7([80, 70, 60, 70], [99, 85, 70, 0], SAMPLE_RATE);
    env.note_on();
    env.note_off();

    let ceiling = 1.0 * scale_rate(99.0, 0.0, 1.0);
    for _ in 0..200_000 {
        let level = env.next_level();
        assert!(level >= 0.0, "level went negative: {}", level);
        assert!(level <= ceiling, "level exceeded peak: {}", level);
    }
}

#[test]
fn release_is_absorbing_until_next_note_on() {
    let mut env = Envelope::new();
    env.set_dx7([90, 80, 70, 80], [99, 90, 75, 0], SAMPLE_RATE);
    env.note_on();
    for _ in 0..1000 {
        env.next_level();
    }

    env.note_off();
    assert_eq!(env.current_step(), StepId::Release);

    // However long it runs, release never advances anywhere else.
    for _ in 0..500_000 {
        env.next_level();
        assert_eq!(env.current_step(), StepId::Release);
    }

    // A new note-on must restore the attack stage within one call.
    env.note_on();
    assert_eq!(env.current_step(), StepId::Attack);
    assert_eq!(env.level(), 0.0);
}

#[test]
fn level_chain_follows_configured_levels() {
    let mut env = Envelope::new();
    env.set_dx7([99, 90, 85, 70], [99, 70, 50, 0], SAMPLE_RATE);
    env.note_on();

    // Run long enough to settle into sustain; the sustain plateau must sit at
    // the scaled third level.
    let mut level = 0.0;
    for _ in 0..400_000 {
        level = env.next_level();
        if env.current_step() == StepId::Sustain {
            break;
        }
    }
    assert_eq!(env.current_step(), StepId::Sustain);
    assert!((level - 50.0 / 99.0).abs() < 0.01, "sustain level {}", level);
}
