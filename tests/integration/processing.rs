//! Processing integration tests
//!
//! Deferred start, the per-device duration watchdog and idle shutdown, with
//! the timer and clock driven by hand.

use mdc::prelude::*;
use mdc::{ProcessingState, Transition};

use crate::helpers::*;

#[test]
fn test_note_defers_start_to_update() {
    let mut rig = round_robin_rig(2);

    rig.mdc.process_bytes(&[0x90, 60, 100]);
    assert!(!rig.mdc.is_processing());
    assert!(!rig.timer.is_attached());

    assert_eq!(rig.mdc.update(), Transition::Started);
    assert!(rig.mdc.is_processing());
    assert_eq!(rig.timer.interval_us(), Some(TEST_RESOLUTION_US));

    assert_eq!(rig.mdc.update(), Transition::None);
}

#[test]
fn test_watchdog_clears_stuck_note() {
    let mut rig = round_robin_rig(2);
    rig.mdc.process_bytes(&[0x90, 60, 100]);
    rig.mdc.update();

    // Exactly at the ceiling the note is still held
    rig.timer.fire_n(TEST_MAX_DURATION_MS as usize);
    assert_eq!(rig.notes(2)[0], Some(60));

    rig.timer.fire();
    assert_eq!(rig.notes(2)[0], None);
    assert_eq!(rig.log.for_device(0), vec![Output::On(60), Output::Off]);
    assert_eq!(rig.mdc.scheduler().expiration_count(), 1);

    // The expired device is available again for the chain
    rig.mdc.process_bytes(&[62, 100, 64, 100]);
    assert_eq!(rig.notes(2), vec![Some(64), Some(62)]);
}

#[test]
fn test_watchdog_is_per_device() {
    let mut rig = round_robin_rig(2);
    rig.mdc.start_processing();

    rig.mdc.assign_chain_note(0, 60);
    rig.timer.fire_n(30);
    rig.mdc.assign_chain_note(0, 62);
    rig.timer.fire_n(21);

    // Device 0 has run 51ms, device 1 only 21ms
    assert_eq!(rig.notes(2), vec![None, Some(62)]);
}

#[test]
fn test_idle_timeout_powers_down() {
    let mut rig = round_robin_rig(2);
    rig.mdc.process_bytes(&[0x90, 60, 100]);
    rig.mdc.update();

    rig.clock.advance(u64::from(TEST_IDLE_TIMEOUT_MS) - 1);
    assert_eq!(rig.mdc.update(), Transition::None);

    // Activity pushes the deadline out
    rig.mdc.process_bytes(&[62, 100]);
    rig.clock.advance(10);
    assert_eq!(rig.mdc.update(), Transition::None);

    rig.clock.advance(u64::from(TEST_IDLE_TIMEOUT_MS));
    assert_eq!(rig.mdc.update(), Transition::Stopped);
    assert!(!rig.timer.is_attached());
    assert_eq!(rig.notes(2), vec![None, None]);
    assert_eq!(
        rig.mdc.scheduler().processing_state(),
        ProcessingState::Idle
    );
}

#[test]
fn test_stop_processing_silences_everything() {
    let mut rig = round_robin_rig(3);
    rig.mdc.start_processing();
    rig.mdc.process_bytes(&[0x90, 60, 100, 62, 100]);

    rig.mdc.stop_processing();
    assert!(!rig.mdc.is_processing());
    assert!(!rig.timer.is_attached());
    assert_eq!(rig.notes(3), vec![None, None, None]);
    assert_eq!(rig.timer.fire_n(10), 0);
}

#[test]
fn test_manual_processing_mode() {
    let mut rig = round_robin_rig(2);
    rig.mdc.set_auto_process(false);

    rig.mdc.process_bytes(&[0x90, 60, 100]);
    assert_eq!(rig.mdc.update(), Transition::None);
    assert!(!rig.mdc.is_processing());

    assert!(rig.mdc.start_processing());
    assert!(rig.timer.is_attached());
}

#[test]
fn test_settings_while_active() {
    let mut rig = round_robin_rig(1);
    rig.mdc.start_processing();

    rig.mdc.set_resolution(500).unwrap();
    assert_eq!(rig.timer.interval_us(), Some(500));

    rig.mdc.set_max_duration(5).unwrap();
    rig.mdc.assign_chain_note(0, 60);
    rig.timer.fire_n(10);
    assert_eq!(rig.notes(1), vec![Some(60)]);
    rig.timer.fire();
    assert_eq!(rig.notes(1), vec![None]);

    assert!(rig.mdc.set_resolution(0).is_err());
    assert!(rig.mdc.set_max_duration(0).is_err());

    rig.mdc.set_idle_timeout(0);
    rig.clock.advance(1_000_000);
    assert_eq!(rig.mdc.update(), Transition::None);
}

#[test]
fn test_poll_drains_serial_buffer() {
    use ringbuf::traits::Producer;

    let mut rig = round_robin_rig(2);
    let (mut uart, mut rx) = serial_buffer(64);

    uart.push_slice(&[0x90, 60, 100, 62]);
    assert_eq!(rig.mdc.poll(&mut rx), 1);
    // poll runs the processing update too
    assert!(rig.mdc.is_processing());

    uart.push_slice(&[100]);
    assert_eq!(rig.mdc.poll(&mut rx), 1);
    assert_eq!(rig.notes(2), vec![Some(60), Some(62)]);
}
