//! Chain integration tests
//!
//! Allocation strategies driven through the controller.

use mdc::prelude::*;
use mdc::{Device, Error};

use crate::helpers::*;

#[test]
fn test_direct_chain_plays_unison() {
    let mut rig = test_rig(3);
    rig.mdc.create_chain(0, ChainType::Direct, &[0, 1, 2]).unwrap();

    rig.mdc.assign_device_note(1, 40);
    assert!(rig.mdc.assign_chain_note(0, 60));
    assert_eq!(rig.notes(3), vec![Some(60), Some(40), Some(60)]);

    assert!(rig.mdc.clear_chain_note(0, 60));
    assert_eq!(rig.notes(3), vec![None, Some(40), None]);
}

#[test]
fn test_first_available_chain() {
    let mut rig = test_rig(3);
    rig.mdc
        .create_chain(0, ChainType::FirstAvailable, &[2, 1, 0])
        .unwrap();

    rig.mdc.process_bytes(&[0x90, 60, 100, 62, 100]);
    assert_eq!(rig.notes(3), vec![None, Some(62), Some(60)]);
}

#[test]
fn test_round_robin_exhaustion_drops_note() {
    let mut rig = round_robin_rig(2);

    assert!(rig.mdc.assign_chain_note(0, 60));
    assert!(rig.mdc.assign_chain_note(0, 62));
    let cursor = rig.mdc.chain(0).unwrap().cursor();

    assert!(!rig.mdc.assign_chain_note(0, 64));
    assert_eq!(rig.mdc.chain(0).unwrap().cursor(), cursor);
    assert_eq!(rig.notes(2), vec![Some(60), Some(62)]);
}

#[test]
fn test_chains_on_separate_channels() {
    let mut rig = test_rig(4);
    rig.mdc.create_chain(0, ChainType::RoundRobin, &[0, 1]).unwrap();
    rig.mdc.create_chain(1, ChainType::RoundRobin, &[2, 3]).unwrap();
    rig.mdc.routing_mut().set(1, Some(Route::Chain(1))).unwrap();

    rig.mdc.process_bytes(&[0x90, 60, 100, 0x91, 72, 100]);
    assert_eq!(rig.notes(4), vec![Some(60), None, Some(72), None]);
}

#[test]
fn test_deleted_device_is_skipped_by_chain() {
    let mut rig = round_robin_rig(3);

    assert!(rig.mdc.delete_device(0));
    rig.mdc.process_bytes(&[0x90, 60, 100, 62, 100]);
    assert_eq!(rig.notes(3), vec![None, Some(60), Some(62)]);

    // Both live members busy, the dead one never takes a note
    assert!(!rig.mdc.assign_chain_note(0, 64));
}

#[test]
fn test_deleted_device_with_kept_handle_never_sounds() {
    let mut rig = test_rig(2);
    rig.mdc
        .create_chain(0, ChainType::FirstAvailable, &[0, 1])
        .unwrap();
    let kept = rig.mdc.device(0).unwrap();

    assert!(rig.mdc.delete_device(0));
    rig.log.take();
    assert!(rig.mdc.assign_chain_note(0, 60));
    assert_eq!(kept.current_note(), None);
    assert_eq!(rig.notes(2), vec![None, Some(60)]);
    assert!(rig.log.for_device(0).is_empty());

    rig.mdc.update();
    rig.timer.fire_n(TEST_MAX_DURATION_MS as usize + 1);
    assert_eq!(kept.current_note(), None);
    assert_eq!(rig.notes(2), vec![None, None]);
}

#[test]
fn test_delete_chain_keeps_device_notes() {
    let mut rig = round_robin_rig(2);
    rig.mdc.assign_chain_note(0, 60);

    assert!(rig.mdc.delete_chain(0));
    assert!(rig.mdc.chain(0).is_none());
    assert_eq!(rig.notes(2)[0], Some(60));

    // Routing to a deleted chain is a no-op
    assert_eq!(rig.mdc.process_bytes(&[0x90, 62, 100]), 1);
    assert_eq!(rig.notes(2), vec![Some(60), None]);
}

#[test]
fn test_create_chain_errors() {
    let mut rig = round_robin_rig(2);

    assert_eq!(
        rig.mdc.create_chain(0, ChainType::Direct, &[1]),
        Err(Error::Chain(mdc::chain::Error::SlotOccupied(0)))
    );
    assert_eq!(
        rig.mdc.create_chain(1, ChainType::Direct, &[0, 9]),
        Err(Error::Chain(mdc::chain::Error::UnknownDevice(9)))
    );
    assert_eq!(
        rig.mdc.create_chain(1, ChainType::Direct, &[]),
        Err(Error::Chain(mdc::chain::Error::EmptyChain))
    );
    assert!(matches!(
        rig.mdc.create_chain(mdc::MAX_CHAINS, ChainType::Direct, &[0]),
        Err(Error::Chain(mdc::chain::Error::SlotOutOfRange { .. }))
    ));
    assert_eq!(rig.mdc.chains().chain_count(), 1);
}
