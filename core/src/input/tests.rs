//! Tests for input reduction

use super::*;

fn held(reducer: &InputReducer, button: VirtualButton) -> bool {
    reducer.frame().controllers[MERGED_SLOT].button(button).ended_down
}

fn transitions(reducer: &InputReducer, button: VirtualButton) -> u32 {
    reducer.frame().controllers[MERGED_SLOT]
        .button(button)
        .half_transition_count
}

#[test]
fn keyboard_transitions_count_events_within_frame() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();

    // Press, release, press inside one frame: three observed edges.
    reducer.key_event(VirtualButton::ActionDown, true);
    reducer.key_event(VirtualButton::ActionDown, false);
    reducer.key_event(VirtualButton::ActionDown, true);

    assert!(held(&reducer, VirtualButton::ActionDown));
    assert_eq!(transitions(&reducer, VirtualButton::ActionDown), 3);
}

#[test]
fn held_key_carries_forward_without_events() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();
    reducer.key_event(VirtualButton::Start, true);
    reducer.end_frame();

    // No events this frame: state is inherited, counts are reset.
    reducer.begin_frame();
    assert!(held(&reducer, VirtualButton::Start));
    assert_eq!(transitions(&reducer, VirtualButton::Start), 0);
}

#[test]
fn pad_button_edges_are_per_frame() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Button { index: 7, pressed: true });
    assert!(held(&reducer, VirtualButton::Start));
    assert_eq!(transitions(&reducer, VirtualButton::Start), 1);
    reducer.end_frame();

    // Same raw level reported again: no edge.
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Button { index: 7, pressed: true });
    assert!(held(&reducer, VirtualButton::Start));
    assert_eq!(transitions(&reducer, VirtualButton::Start), 0);
}

#[test]
fn unknown_pad_button_is_ignored() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Button { index: 13, pressed: true });
    for button in VirtualButton::ALL {
        assert!(!held(&reducer, button));
    }
}

#[test]
fn dead_zone_boundary_maps_to_zero() {
    assert_eq!(normalize_axis(0), 0.0);
    assert_eq!(normalize_axis(DEAD_ZONE), 0.0);
    assert_eq!(normalize_axis(-DEAD_ZONE), 0.0);
    assert_eq!(normalize_axis(DEAD_ZONE - 1), 0.0);
}

#[test]
fn axis_limits_map_to_unit_deflection() {
    assert_eq!(normalize_axis(32767), 1.0);
    assert_eq!(normalize_axis(-32768), -1.0);
}

#[test]
fn axis_rescales_from_dead_zone_edge() {
    // Just past the dead zone: small but nonzero, sign preserved.
    let just_past = normalize_axis(DEAD_ZONE + 1);
    assert!(just_past > 0.0 && just_past < 0.01);
    let negative = normalize_axis(-(DEAD_ZONE + 1));
    assert!(negative < 0.0 && negative > -0.01);
}

#[test]
fn full_deflection_derives_movement_with_single_edge() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Axis { index: 0, value: 32767 });

    let controller = &reducer.frame().controllers[MERGED_SLOT];
    assert!(controller.is_analog);
    assert_eq!(controller.stick_x, 1.0);
    assert!(held(&reducer, VirtualButton::MoveRight));
    assert_eq!(transitions(&reducer, VirtualButton::MoveRight), 1);
    reducer.end_frame();

    // Holding the same deflection: still down, no new edge.
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Axis { index: 0, value: 32767 });
    assert!(held(&reducer, VirtualButton::MoveRight));
    assert_eq!(transitions(&reducer, VirtualButton::MoveRight), 0);
    reducer.end_frame();

    // No event at all (a real stick held steady stays silent): carried.
    reducer.begin_frame();
    assert!(held(&reducer, VirtualButton::MoveRight));
    assert_eq!(transitions(&reducer, VirtualButton::MoveRight), 0);
}

#[test]
fn sub_threshold_deflection_releases_movement() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Axis { index: 0, value: 32767 });
    reducer.end_frame();

    reducer.begin_frame();
    reducer.pad_event(PadEvent::Axis { index: 0, value: 0 });
    assert!(!held(&reducer, VirtualButton::MoveRight));
    assert_eq!(transitions(&reducer, VirtualButton::MoveRight), 1);
}

#[test]
fn one_axis_event_does_not_clobber_the_other_axis() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Axis { index: 0, value: 32767 });
    reducer.pad_event(PadEvent::Axis { index: 1, value: -32768 });

    let controller = &reducer.frame().controllers[MERGED_SLOT];
    assert_eq!(controller.stick_x, 1.0);
    assert_eq!(controller.stick_y, -1.0);
    assert!(held(&reducer, VirtualButton::MoveRight));
    assert!(held(&reducer, VirtualButton::MoveUp));
}

#[test]
fn joystick_silence_does_not_release_keyboard_buttons() {
    let mut reducer = InputReducer::new();
    reducer.begin_frame();
    reducer.key_event(VirtualButton::ActionUp, true);
    reducer.end_frame();

    // A frame full of joystick traffic on other controls.
    reducer.begin_frame();
    reducer.pad_event(PadEvent::Axis { index: 0, value: 32767 });
    reducer.pad_event(PadEvent::Button { index: 7, pressed: true });
    assert!(held(&reducer, VirtualButton::ActionUp));
    assert_eq!(transitions(&reducer, VirtualButton::ActionUp), 0);
}

#[test]
fn keymap_roundtrip() {
    let mapping = KeyboardMapping::default();

    let toml_str = toml::to_string(&mapping).expect("serialize");
    assert!(toml_str.contains("\"W\""));
    assert!(toml_str.contains("ArrowUp"));
    assert!(toml_str.contains("Enter"));
    assert!(toml_str.contains("ShiftLeft"));

    let parsed: KeyboardMapping = toml::from_str(&toml_str).expect("deserialize");
    assert_eq!(mapping, parsed);
}

#[test]
fn keymap_partial_config_uses_defaults() {
    let parsed: KeyboardMapping = toml::from_str(
        r#"
        move_up = "I"
        move_down = "K"
        "#,
    )
    .expect("deserialize");

    assert_eq!(parsed.move_up, winit::keyboard::KeyCode::KeyI);
    assert_eq!(parsed.move_down, winit::keyboard::KeyCode::KeyK);
    assert_eq!(parsed.start, winit::keyboard::KeyCode::Enter);
}

#[test]
fn keymap_resolve_covers_every_button() {
    let table = KeyboardMapping::default().resolve();
    assert_eq!(table.len(), VirtualButton::COUNT);
    assert_eq!(
        table.get(&winit::keyboard::KeyCode::KeyW),
        Some(&VirtualButton::MoveUp)
    );
    assert_eq!(
        table.get(&winit::keyboard::KeyCode::ArrowDown),
        Some(&VirtualButton::ActionDown)
    );
}
