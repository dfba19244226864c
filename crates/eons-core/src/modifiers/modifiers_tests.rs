#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn ActivationModifiers___default___is_empty() {
    assert!(ActivationModifiers::default().is_empty());
    assert_eq!(ActivationModifiers::default(), ActivationModifiers::NONE);
}

#[test]
fn ActivationModifiers___bitor___combines() {
    let mut modifiers = ActivationModifiers::SHIFT | ActivationModifiers::ALT;
    modifiers |= ActivationModifiers::META;

    assert!(modifiers.contains(ActivationModifiers::SHIFT));
    assert!(modifiers.contains(ActivationModifiers::ALT | ActivationModifiers::META));
    assert!(!modifiers.contains(ActivationModifiers::CTRL));
}

#[test]
fn ActivationModifiers___contains___none_always_held() {
    assert!(ActivationModifiers::NONE.contains(ActivationModifiers::NONE));
    assert!(ActivationModifiers::CTRL.contains(ActivationModifiers::NONE));
}

#[test_case(ActivationModifiers::NONE, "none")]
#[test_case(ActivationModifiers::SHIFT, "shift")]
#[test_case(ActivationModifiers::SHIFT | ActivationModifiers::CTRL, "shift+ctrl")]
#[test_case(ActivationModifiers::from_bits(0x20), "0x20")]
#[test_case(ActivationModifiers::from_bits(0x21), "shift+0x20")]
fn ActivationModifiers___display___names_keys(modifiers: ActivationModifiers, expected: &str) {
    assert_eq!(modifiers.to_string(), expected);
}

#[test]
fn ActivationModifiers___bits___round_trip() {
    let modifiers = ActivationModifiers::from_bits(0b1010);

    assert_eq!(modifiers.bits(), 0b1010);
    assert_eq!(modifiers, ActivationModifiers::CTRL | ActivationModifiers::META);
}
