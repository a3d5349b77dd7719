use live_chat_overlay::host::FullscreenSignals;
use live_chat_overlay::overlay::document::{ControlButton, RESTORE_LABEL, UNAVAILABLE_NOTICE};
use live_chat_overlay::overlay::{
    GestureKind, Key, KeyEvent, KeyOutcome, PointerButton, PointerEvent, PointerTarget,
    ResizeDirection, OVERLAY_ID,
};
use live_chat_overlay::persistence::{load_minimized_state, load_position, load_size, save_geometry};
use live_chat_overlay::video::BLANK_SOURCE;
use live_chat_overlay::{
    Geometry, MemoryStore, OverlayManager, PointerId, Position, Size, Viewport,
};
use std::time::{Duration, Instant};

use mock_host::{MockHost, VIDEO_ID};

type Manager = OverlayManager<MockHost, MemoryStore>;

const DEBOUNCE: Duration = Duration::from_millis(100);

fn fullscreen_with(store: MemoryStore) -> Manager {
    let mut manager = OverlayManager::new(MockHost::fullscreen(), store);
    manager.initialize();
    manager
}

fn seeded(geometry: Geometry) -> MemoryStore {
    let mut store = MemoryStore::new();
    save_geometry(&mut store, &geometry).expect("seed geometry");
    store
}

fn set_fullscreen(manager: &mut Manager, on: bool, now: Instant) -> Instant {
    manager.host_mut().signals = if on {
        FullscreenSignals::standard()
    } else {
        FullscreenSignals::none()
    };
    manager.on_fullscreen_change(now);
    let settled = now + DEBOUNCE;
    manager.tick(settled);
    settled
}

fn pointer(id: i32, x: i32, y: i32, target: PointerTarget, now: Instant) -> PointerEvent {
    PointerEvent {
        pointer: PointerId(id),
        button: PointerButton::Primary,
        x,
        y,
        target,
        now,
    }
}

fn geometry(manager: &Manager) -> Geometry {
    manager.overlay().expect("overlay mounted").geometry
}

#[test]
fn fullscreen_burst_is_debounced_into_one_show() {
    let mut manager = OverlayManager::new(MockHost::default(), MemoryStore::new());
    manager.initialize();
    assert!(manager.overlay().is_none());

    let start = Instant::now();
    manager.host_mut().signals = FullscreenSignals::standard();
    manager.on_fullscreen_change(start);
    manager.on_fullscreen_change(start + Duration::from_millis(30));
    manager.tick(start + Duration::from_millis(50));
    assert!(manager.overlay().is_none());

    manager.tick(start + Duration::from_millis(130));
    assert!(manager.is_shown());
    assert_eq!(manager.host().liveness_checks, 1);

    let overlay = manager.overlay().expect("overlay");
    assert_eq!(
        overlay.frame_src(),
        Some(format!("https://www.youtube.com/live_chat?v={VIDEO_ID}").as_str())
    );
    assert!(overlay.spinner_visible);

    manager.on_frame_loaded();
    assert!(!manager.overlay().expect("overlay").spinner_visible);
}

#[test]
fn leaving_fullscreen_removes_overlay_and_saves_geometry() {
    let mut manager = fullscreen_with(MemoryStore::new());
    let shown = geometry(&manager);
    assert!(manager.store().is_empty());

    set_fullscreen(&mut manager, false, Instant::now());

    assert!(manager.overlay().is_none());
    assert_eq!(load_position(manager.store_mut()), Some(shown.position()));
    assert_eq!(load_size(manager.store_mut()), Some(shown.size()));
}

#[test]
fn stored_geometry_is_restored_as_is_when_it_fits() {
    let manager = fullscreen_with(seeded(Geometry::new(600, 50, 400, 500)));
    assert_eq!(geometry(&manager), Geometry::new(600, 50, 400, 500));
}

#[test]
fn showing_twice_keeps_one_node_without_drift() {
    let mut manager = fullscreen_with(seeded(Geometry::new(600, 50, 400, 500)));
    let first = manager.show().expect("first show");
    let second = manager.show().expect("second show");

    assert_eq!(manager.document().count(OVERLAY_ID), 1);
    assert_eq!(first.geometry, second.geometry);
}

#[test]
fn header_drag_persists_dropped_position() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));
    let start = Instant::now();

    assert!(manager.on_pointer_down(pointer(1, 120, 110, PointerTarget::Header, start)));
    assert!(manager.on_pointer_move(pointer(
        1,
        170,
        90,
        PointerTarget::Header,
        start + Duration::from_millis(40)
    )));
    assert_eq!(manager.active_gesture(), Some(GestureKind::Drag));
    assert_eq!(manager.host().captured, vec![PointerId(1)]);

    manager.on_pointer_up(pointer(
        1,
        170,
        90,
        PointerTarget::Header,
        start + Duration::from_millis(60),
    ));

    assert_eq!(manager.active_gesture(), None);
    assert!(manager.host().captured.is_empty());
    assert!(manager.host().user_select);
    assert_eq!(
        load_position(manager.store_mut()),
        Some(Position { left: 150, top: 80 })
    );
}

#[test]
fn drag_past_the_edge_persists_the_clamped_position() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));
    let start = Instant::now();

    manager.on_pointer_down(pointer(1, 120, 110, PointerTarget::Header, start));
    manager.on_pointer_move(pointer(1, 2000, 110, PointerTarget::Page, start));
    manager.on_pointer_up(pointer(1, 2000, 110, PointerTarget::Page, start));

    assert_eq!(
        load_position(manager.store_mut()),
        Some(Position { left: 624, top: 100 })
    );
}

#[test]
fn header_click_without_movement_times_out_quietly() {
    let mut manager = fullscreen_with(MemoryStore::new());
    let start = Instant::now();

    assert!(manager.on_pointer_down(pointer(1, 700, 90, PointerTarget::Header, start)));
    manager.tick(start + Duration::from_millis(300));

    assert_eq!(manager.active_gesture(), None);
    assert!(manager.host().captured.is_empty());
}

#[test]
fn second_gesture_is_refused_while_one_is_running() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));
    let start = Instant::now();
    let corner = PointerTarget::ResizeHandle(ResizeDirection::SouthEast);

    assert!(manager.on_pointer_down(pointer(1, 120, 110, PointerTarget::Header, start)));
    assert!(!manager.on_pointer_down(pointer(2, 500, 400, corner, start)));
    assert_eq!(manager.active_gesture(), Some(GestureKind::Drag));

    manager.on_pointer_up(pointer(1, 120, 110, PointerTarget::Header, start));
    assert!(manager.on_pointer_down(pointer(2, 500, 400, corner, start)));
    assert_eq!(
        manager.active_gesture(),
        Some(GestureKind::Resize(ResizeDirection::SouthEast))
    );
    assert!(!manager.on_pointer_down(pointer(1, 120, 110, PointerTarget::Header, start)));
}

#[test]
fn resize_persists_intended_size_and_a_larger_viewport_brings_it_back() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));
    let start = Instant::now();
    let corner = PointerTarget::ResizeHandle(ResizeDirection::SouthEast);

    assert!(manager.on_pointer_down(pointer(2, 500, 400, corner, start)));
    assert_eq!(manager.host().cursor, Some("se-resize"));
    manager.on_pointer_move(pointer(2, 1600, 1500, PointerTarget::Page, start));
    manager.on_pointer_up(pointer(2, 1600, 1500, PointerTarget::Page, start));

    let shown = geometry(&manager);
    assert!(shown.fits_in(Viewport::new(1024, 768)));
    assert_eq!(load_size(manager.store_mut()), Some(Size::new(1500, 1400)));
    assert_eq!(load_position(manager.store_mut()), Some(shown.position()));
    assert_eq!(manager.host().cursor, None);
    assert_eq!(manager.host().resize_dispatches, 1);

    manager.host_mut().viewport = Viewport::new(2560, 1600);
    manager.on_window_resize(start + Duration::from_secs(1));
    assert_eq!(geometry(&manager).size(), Size::new(1500, 1400));
}

#[test]
fn oversized_resize_stays_put_across_same_viewport_resize_and_reshow() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));
    let start = Instant::now();
    let corner = PointerTarget::ResizeHandle(ResizeDirection::SouthEast);

    manager.on_pointer_down(pointer(2, 500, 400, corner, start));
    manager.on_pointer_move(pointer(2, 1600, 1500, PointerTarget::Page, start));
    manager.on_pointer_up(pointer(2, 1600, 1500, PointerTarget::Page, start));
    let resized = geometry(&manager);
    assert_eq!(resized, Geometry::new(100, 77, 921, 691));

    manager.on_window_resize(start + Duration::from_millis(10));
    manager.tick(start + Duration::from_millis(200));
    assert_eq!(geometry(&manager), resized);

    let left = set_fullscreen(&mut manager, false, start + Duration::from_secs(1));
    set_fullscreen(&mut manager, true, left + Duration::from_millis(50));
    assert_eq!(geometry(&manager), resized);
}

#[test]
fn window_resize_waits_for_a_running_drag() {
    let mut manager = fullscreen_with(seeded(Geometry::new(600, 400, 400, 300)));
    let start = Instant::now();

    manager.on_pointer_down(pointer(1, 700, 410, PointerTarget::Header, start));
    manager.on_pointer_move(pointer(1, 720, 430, PointerTarget::Header, start));
    assert_eq!(manager.active_gesture(), Some(GestureKind::Drag));
    let dragging = geometry(&manager);

    manager.host_mut().viewport = Viewport::new(640, 480);
    manager.on_window_resize(start + Duration::from_millis(5));
    assert_eq!(geometry(&manager), dragging);

    manager.on_pointer_up(pointer(1, 720, 430, PointerTarget::Header, start + Duration::from_millis(20)));
    manager.tick(start + Duration::from_millis(150));

    let refitted = geometry(&manager);
    assert_eq!(refitted, Geometry::new(240, 180, 400, 300));
    assert!(refitted.fits_in(Viewport::new(640, 480)));
}

#[test]
fn cancelled_resize_keeps_the_size_reached() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));
    let start = Instant::now();
    let edge = PointerTarget::ResizeHandle(ResizeDirection::East);

    manager.on_pointer_down(pointer(4, 500, 250, edge, start));
    manager.on_pointer_move(pointer(4, 600, 250, PointerTarget::Page, start));
    manager.on_pointer_cancel(pointer(4, 600, 250, PointerTarget::Page, start));

    assert_eq!(manager.active_gesture(), None);
    assert_eq!(load_size(manager.store_mut()), Some(Size::new(500, 300)));
    let frame = manager.overlay().and_then(|node| node.frame.as_ref()).expect("frame");
    assert!(frame.pointer_events);
}

#[test]
fn window_blur_releases_a_running_drag() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));
    let start = Instant::now();

    manager.on_pointer_down(pointer(1, 120, 110, PointerTarget::Header, start));
    manager.on_pointer_move(pointer(1, 140, 130, PointerTarget::Page, start));
    assert_eq!(manager.host().captured, vec![PointerId(1)]);

    manager.on_window_blur();

    assert!(manager.host().captured.is_empty());
    assert_eq!(manager.active_gesture(), None);
    assert_eq!(
        load_position(manager.store_mut()),
        Some(Position { left: 120, top: 120 })
    );
}

#[test]
fn escape_ends_gesture_then_closes_settings_panel() {
    let mut manager = fullscreen_with(MemoryStore::new());
    let start = Instant::now();
    let escape = KeyEvent {
        key: Key::Escape,
        header_focused: false,
    };

    manager.on_pointer_down(pointer(1, 700, 90, PointerTarget::Header, start));
    assert_eq!(manager.on_key(escape.clone()), KeyOutcome::Handled);
    assert_eq!(manager.active_gesture(), None);

    assert!(manager.on_click(PointerTarget::Control(ControlButton::Settings)));
    assert!(manager.overlay().is_some_and(|node| node.is_settings_open()));
    assert_eq!(manager.on_key(escape.clone()), KeyOutcome::Handled);
    assert!(!manager.overlay().is_some_and(|node| node.is_settings_open()));
    assert_eq!(manager.on_key(escape), KeyOutcome::Ignored);
}

#[test]
fn arrow_keys_nudge_and_persist() {
    let mut manager = fullscreen_with(seeded(Geometry::new(100, 100, 400, 300)));

    let outcome = manager.on_key(KeyEvent {
        key: Key::from_name("ArrowLeft"),
        header_focused: true,
    });

    assert_eq!(outcome, KeyOutcome::Moved(Position { left: 90, top: 100 }));
    assert!(outcome.prevents_default());
    assert_eq!(
        load_position(manager.store_mut()),
        Some(Position { left: 90, top: 100 })
    );
}

#[test]
fn minimize_survives_a_show_hide_cycle() {
    let mut manager = fullscreen_with(MemoryStore::new());
    let restored_size = geometry(&manager).size();

    assert!(manager.on_click(PointerTarget::Control(ControlButton::Minimize)));
    assert_eq!(geometry(&manager), Geometry::new(724, 384, 300, 40));
    assert_eq!(
        load_minimized_state(manager.store_mut()),
        (true, Some(restored_size))
    );

    let now = set_fullscreen(&mut manager, false, Instant::now());
    set_fullscreen(&mut manager, true, now);

    let node = manager.overlay().expect("overlay");
    assert!(node.minimized);
    assert_eq!(node.geometry.size(), Size::new(300, 40));
    let label = node
        .header
        .as_ref()
        .and_then(|header| header.button(ControlButton::Minimize))
        .map(|button| button.label.as_str());
    assert_eq!(label, Some(RESTORE_LABEL));

    manager.on_click(PointerTarget::Control(ControlButton::Minimize));
    assert_eq!(geometry(&manager), Geometry::new(614, 384, 400, 200));
    assert_eq!(load_minimized_state(manager.store_mut()), (false, None));
}

#[test]
fn close_button_hides_until_fullscreen_is_entered_again() {
    let mut manager = fullscreen_with(MemoryStore::new());

    assert!(manager.on_click(PointerTarget::Control(ControlButton::Close)));
    assert!(manager.overlay().is_none());

    let now = set_fullscreen(&mut manager, false, Instant::now());
    assert!(manager.overlay().is_none());
    set_fullscreen(&mut manager, true, now);
    assert!(manager.is_shown());
}

#[test]
fn window_resize_is_throttled_and_refits_from_intended_size() {
    let mut manager = fullscreen_with(seeded(Geometry::new(600, 400, 400, 300)));
    let start = Instant::now();

    manager.host_mut().viewport = Viewport::new(640, 480);
    manager.on_window_resize(start);
    assert_eq!(geometry(&manager), Geometry::new(240, 180, 400, 300));

    manager.host_mut().viewport = Viewport::new(320, 480);
    manager.on_window_resize(start + Duration::from_millis(10));
    assert_eq!(geometry(&manager), Geometry::new(240, 180, 400, 300));

    manager.tick(start + Duration::from_millis(100));
    assert_eq!(geometry(&manager), Geometry::new(0, 180, 288, 300));
    assert_eq!(
        manager.overlay().expect("overlay").intended_size,
        Size::new(400, 300)
    );
}

#[test]
fn navigation_reloads_chat_or_hides_overlay() {
    let mut manager = fullscreen_with(MemoryStore::new());

    manager.host_mut().location = "https://www.youtube.com/watch?v=abcdefghijk".to_string();
    manager.on_page_mutation();
    assert_eq!(
        manager.overlay().and_then(|node| node.frame_src()),
        Some("https://www.youtube.com/live_chat?v=abcdefghijk")
    );
    assert_eq!(manager.host().liveness_checks, 2);

    manager.on_page_mutation();
    assert_eq!(manager.host().liveness_checks, 2);

    manager.host_mut().location = "https://www.youtube.com/".to_string();
    manager.on_page_mutation();
    assert!(manager.overlay().is_none());

    manager.host_mut().location = "https://www.youtube.com/live/abcdefghijk".to_string();
    manager.on_page_mutation();
    assert!(manager.is_shown());
}

#[test]
fn non_live_video_shows_notice_instead_of_chat() {
    let host = MockHost {
        live: Ok(false),
        ..MockHost::fullscreen()
    };
    let mut manager = OverlayManager::new(host, MemoryStore::new());
    manager.initialize();

    let node = manager.overlay().expect("overlay");
    assert_eq!(node.frame_src(), Some(BLANK_SOURCE));
    assert_eq!(node.notice.as_deref(), Some(UNAVAILABLE_NOTICE));
    assert!(!node.spinner_visible);
}

#[test]
fn shutdown_saves_and_ignores_later_events() {
    let mut manager = fullscreen_with(MemoryStore::new());
    let shown = geometry(&manager);

    manager.shutdown();
    assert!(manager.overlay().is_none());
    assert_eq!(load_position(manager.store_mut()), Some(shown.position()));

    let now = set_fullscreen(&mut manager, false, Instant::now());
    set_fullscreen(&mut manager, true, now);
    manager.on_page_mutation();
    assert!(manager.overlay().is_none());
    assert!(!manager.on_pointer_down(pointer(1, 700, 90, PointerTarget::Header, now)));
}
