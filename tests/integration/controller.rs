//! Controller integration tests
//!
//! Raw MIDI bytes in, actuator calls out.

use mdc::prelude::*;
use mdc::{Error, Transition};

use crate::helpers::*;

#[test]
fn test_running_status_notes_rotate_through_chain() {
    let mut rig = round_robin_rig(3);

    let dispatched = rig.mdc.process_bytes(&[0x90, 60, 100, 62, 100, 64, 100]);
    assert_eq!(dispatched, 3);
    assert_eq!(rig.notes(3), vec![Some(60), Some(62), Some(64)]);

    // Note On with velocity 0 under running status releases the note
    rig.mdc.process_bytes(&[62, 0]);
    assert_eq!(rig.notes(3), vec![Some(60), None, Some(64)]);
    assert_eq!(rig.log.for_device(1), vec![Output::On(62), Output::Off]);
}

#[test]
fn test_message_split_across_calls() {
    let mut rig = round_robin_rig(2);

    assert_eq!(rig.mdc.process_bytes(&[0x90, 60]), 0);
    assert!(rig.mdc.parser().is_pending());
    assert_eq!(rig.mdc.process_bytes(&[100]), 1);
    assert_eq!(rig.notes(2)[0], Some(60));
}

#[test]
fn test_channel_routed_to_single_device() {
    let mut rig = round_robin_rig(3);
    rig.mdc
        .routing_mut()
        .set(1, Some(Route::Device(2)))
        .unwrap();

    rig.mdc.process_bytes(&[0x91, 70, 100]);
    assert_eq!(rig.notes(3), vec![None, None, Some(70)]);

    rig.mdc.process_bytes(&[0x81, 70, 0]);
    assert_eq!(rig.notes(3), vec![None, None, None]);
}

#[test]
fn test_unrouted_channel_is_dropped() {
    let mut rig = round_robin_rig(2);
    rig.mdc.routing_mut().set(5, None).unwrap();

    rig.mdc.process_bytes(&[0x95, 60, 100]);
    assert_eq!(rig.notes(2), vec![None, None]);
    assert!(rig.log.take().is_empty());
}

#[test]
fn test_pitch_bend_broadcast_to_chain() {
    let mut rig = round_robin_rig(3);

    rig.mdc.process_bytes(&[0xE0, 0x00, 0x40]);
    for device in 0..3 {
        assert_eq!(rig.log.for_device(device), vec![Output::Bend(0x2000)]);
    }
}

#[test]
fn test_unrecognized_messages_leave_devices_alone() {
    let mut rig = round_robin_rig(2);

    let dispatched = rig.mdc.process_bytes(&[0xB0, 7, 100, 0xC0, 3, 0xF8]);
    assert_eq!(dispatched, 0);
    assert!(rig.log.take().is_empty());
    assert_eq!(rig.mdc.parser().discarded_count(), 2);
}

#[test]
fn test_direct_device_operations() {
    let rig = test_rig(2);

    assert!(rig.mdc.assign_device_note(1, 50));
    assert!(!rig.mdc.assign_device_note(1, 51));
    assert!(rig.mdc.bend_device(1, 0x3000));
    assert!(rig.mdc.clear_device_note(1, 50));
    assert_eq!(
        rig.log.for_device(1),
        vec![Output::On(50), Output::Bend(0x3000), Output::Off]
    );

    // Out of range slots mutate nothing
    assert!(!rig.mdc.assign_device_note(99, 50));
    assert!(!rig.mdc.bend_device(99, 0));
}

#[test]
fn test_add_device_errors_propagate() {
    let mut rig = test_rig(2);

    let err = rig.mdc.add_device(1, rig.log.actuator(1)).unwrap_err();
    assert_eq!(err, Error::Core(mdc::core::Error::SlotOccupied(1)));

    let err = rig.mdc.add_device(mdc::MAX_DEVICES, rig.log.actuator(0)).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(mdc::core::Error::SlotOutOfRange { .. })
    ));
}

#[test]
fn test_reset_and_calibrate_reach_all_devices() {
    let rig = test_rig(2);

    rig.mdc.reset_positions();
    rig.mdc.calibrate_positions();
    assert_eq!(
        rig.log.take(),
        vec![
            (0, Output::Reset),
            (1, Output::Reset),
            (0, Output::Calibrate),
            (1, Output::Calibrate),
        ]
    );
}

#[test]
fn test_status_report() {
    let mut rig = round_robin_rig(2);
    rig.mdc.process_bytes(&[0x90, 60, 100]);
    assert_eq!(rig.mdc.update(), Transition::Started);

    let status = rig.mdc.status();
    assert!(status.is_processing());
    assert_eq!(status.scheduler.sounding(), 1);

    let text = status.to_string();
    assert!(text.contains("Processing active"));
    assert!(text.contains("Device 0: note 60"));
    assert!(text.contains("Chain 0: round-robin [0, 1] (1 sounding)"));
}
