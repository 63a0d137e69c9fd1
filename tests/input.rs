use scratch_runtime::input::{KEY_NAMES, key_code};
use scratch_runtime::prelude::*;

#[test]
fn scratch_key_names_resolve() {
    assert_eq!(lookup_key("space").unwrap(), KeyCode::Space);
    assert_eq!(lookup_key("up arrow").unwrap(), KeyCode::ArrowUp);
    assert_eq!(lookup_key("left arrow").unwrap(), KeyCode::ArrowLeft);
    assert_eq!(lookup_key("a").unwrap(), KeyCode::KeyA);
    assert_eq!(lookup_key("7").unwrap(), KeyCode::Digit7);
    assert_eq!(lookup_key("f12").unwrap(), KeyCode::F12);
}

#[test]
fn lookup_ignores_case() {
    assert_eq!(lookup_key("Space").unwrap(), KeyCode::Space);
    assert_eq!(lookup_key("A").unwrap(), KeyCode::KeyA);
}

#[test]
fn shifted_symbols_share_their_physical_key() {
    assert_eq!(key_code("?"), Some(KeyCode::Slash));
    assert_eq!(key_code("/"), Some(KeyCode::Slash));
    assert_eq!(key_code(")"), Some(KeyCode::Digit0));
    assert_eq!(key_code("+"), Some(KeyCode::Equal));
}

#[test]
fn every_listed_name_has_a_key() {
    for name in KEY_NAMES {
        assert!(key_code(name).is_some(), "{name}");
    }
}

#[test]
fn unknown_name_is_reported_verbatim() {
    let err = lookup_key("Num Lock").unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownKey(ref k) if k == "Num Lock"));
}

#[test]
fn input_state_tracks_held_keys() {
    let mut input = InputState::new();
    assert!(!input.any_key_held());

    input.press(KeyCode::KeyW);
    input.press(KeyCode::Space);
    assert!(input.any_key_held());
    assert!(input.is_key_held(KeyCode::KeyW));

    input.release(KeyCode::KeyW);
    assert!(!input.is_key_held(KeyCode::KeyW));
    assert!(input.is_key_held(KeyCode::Space));

    input.release_all();
    assert!(!input.any_key_held());
}
