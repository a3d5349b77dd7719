//! Owns the overlay for one page: decides when it should exist, mounts and
//! tears it down, routes input to the controllers and persists what they
//! report.
//!
//! Everything is driven from the outside. The embedding loop forwards page
//! events (`on_fullscreen_change`, `on_page_mutation`, pointer and key
//! events) and calls [`OverlayManager::tick`] regularly so debounced and
//! throttled work can run.

use crate::geometry::{reconcile, Geometry, Viewport};
use crate::host::{HostPage, PointerId};
use crate::messages::{ExtensionMessage, ExtensionResponse, InboxPoll, MessageInbox, StatusReport};
use crate::overlay::bridge;
use crate::overlay::content::{apply_source, resolve_source};
use crate::overlay::controls::{self, ControlAction, ControlBindings};
use crate::overlay::document::{Document, OverlayNode, OVERLAY_ID};
use crate::overlay::drag::DragController;
use crate::overlay::factory::{create_overlay, OverlayHandle};
use crate::overlay::keyboard::{Key, KeyEvent, KeyOutcome, KeyboardNudge};
use crate::overlay::resize::ResizeController;
use crate::overlay::session::{GestureKind, PointerEvent, PointerTarget};
use crate::overlay::OverlayConfig;
use crate::persistence::{
    load_geometry, save_final_geometry, save_geometry, save_minimized_state, save_position,
};
use crate::settings::{load_settings, save_settings_patch, ChatSettings, SettingsPatch};
use crate::store::KeyValueStore;
use crate::video::{extract_video_id, is_video_page};
use crate::watchers::{FullscreenWatcher, MutationUrlWatcher, NavigationWatcher, Throttle};
use std::time::Instant;

/// Controllers bound to the mounted overlay. Each one is optional so a piece
/// of markup that failed to attach only disables its own feature.
#[derive(Debug, Default)]
struct Controllers {
    drag: Option<DragController>,
    resize: Option<ResizeController>,
    keyboard: Option<KeyboardNudge>,
    controls: Option<ControlBindings>,
}

impl Controllers {
    fn attach(node: &mut OverlayNode, config: &OverlayConfig) -> Self {
        Self {
            drag: attached(
                "drag",
                DragController::attach(node, config.drag_threshold, config.click_timeout),
            ),
            resize: attached("resize", ResizeController::attach(node)),
            keyboard: attached("keyboard", KeyboardNudge::attach(node, config.nudge_step)),
            controls: Some(ControlBindings::attach(node)),
        }
    }

    fn active_gesture(&self) -> Option<GestureKind> {
        if self.drag.as_ref().is_some_and(DragController::is_active) {
            return Some(GestureKind::Drag);
        }
        self.resize
            .as_ref()
            .and_then(ResizeController::session)
            .map(|session| session.kind)
    }

    /// Gesture outcomes are dropped: the caller saves the node's final
    /// geometry right after.
    fn dispose<H: HostPage + ?Sized>(&mut self, host: &mut H, node: &mut OverlayNode) {
        if let Some(drag) = self.drag.as_mut() {
            if let Some(position) = drag.dispose(host, Some(&mut *node)) {
                tracing::debug!(?position, "drag ended by teardown");
            }
        }
        if let Some(resize) = self.resize.as_mut() {
            if let Some(outcome) = resize.dispose(host, Some(&mut *node)) {
                tracing::debug!(?outcome, "resize ended by teardown");
            }
        }
        if let Some(keyboard) = self.keyboard.as_ref() {
            keyboard.dispose(Some(node));
        }
    }
}

fn attached<T>(feature: &'static str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(controller) => Some(controller),
        Err(err) => {
            tracing::error!(feature, ?err, "controller failed to attach");
            None
        }
    }
}

pub struct OverlayManager<H: HostPage, S: KeyValueStore> {
    host: H,
    store: S,
    config: OverlayConfig,
    document: Document,
    settings: ChatSettings,
    controllers: Option<Controllers>,
    fullscreen: FullscreenWatcher,
    navigation: Box<dyn NavigationWatcher>,
    resize_throttle: Throttle,
    resize_pending: bool,
    /// Viewport the displayed geometry was last fitted to.
    fitted_viewport: Option<Viewport>,
    inbox: Option<MessageInbox>,
    /// Last value of the visibility conjunction. The overlay is mounted or
    /// removed only when this flips, so closing it by hand sticks until the
    /// conjunction drops and comes back.
    wants_overlay: bool,
    shut_down: bool,
}

impl<H: HostPage, S: KeyValueStore> OverlayManager<H, S> {
    pub fn new(host: H, store: S) -> Self {
        Self::with_config(host, store, OverlayConfig::default())
    }

    pub fn with_config(host: H, store: S, config: OverlayConfig) -> Self {
        let settings = load_settings(&store);
        let navigation = Box::new(MutationUrlWatcher::starting_at(host.location()));
        tracing::debug!(?settings, "overlay manager created");
        Self {
            host,
            store,
            config,
            document: Document::new(),
            settings,
            controllers: None,
            fullscreen: FullscreenWatcher::new(config.fullscreen_debounce),
            navigation,
            resize_throttle: Throttle::new(config.resize_throttle),
            resize_pending: false,
            fitted_viewport: None,
            inbox: None,
            wants_overlay: false,
            shut_down: false,
        }
    }

    /// Swaps the URL watcher, e.g. for one backed by history events.
    pub fn with_navigation_watcher(mut self, watcher: Box<dyn NavigationWatcher>) -> Self {
        self.navigation = watcher;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn overlay(&self) -> Option<&OverlayNode> {
        self.document.get(OVERLAY_ID)
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn is_shown(&self) -> bool {
        self.overlay().is_some_and(|node| node.visible)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }

    pub fn active_gesture(&self) -> Option<GestureKind> {
        self.controllers.as_ref().and_then(Controllers::active_gesture)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Reads the page once at startup. A page that is already fullscreen on
    /// a video gets its overlay right away.
    pub fn initialize(&mut self) {
        let is_fullscreen = self.host.is_fullscreen();
        self.fullscreen.prime(is_fullscreen);
        tracing::debug!(is_fullscreen, location = %self.host.location(), "initial page state");
        self.reconcile_visibility();
    }

    fn should_show(&self) -> bool {
        self.fullscreen.is_fullscreen()
            && self.settings.auto_show_fullscreen
            && is_video_page(&self.host.location())
    }

    fn reconcile_visibility(&mut self) {
        if self.shut_down {
            return;
        }
        let wanted = self.should_show();
        if wanted == self.wants_overlay {
            return;
        }
        self.wants_overlay = wanted;
        if wanted {
            tracing::info!("showing chat overlay");
            if self.show().is_some() {
                self.update_content();
            }
        } else {
            tracing::info!("hiding chat overlay");
            self.hide();
        }
    }

    /// Mounts the overlay, or reveals the mounted one, with the stored
    /// geometry applied. Controllers are bound once per mounted node.
    pub fn show(&mut self) -> Option<OverlayHandle> {
        if self.shut_down {
            tracing::warn!("overlay manager is shut down; not showing overlay");
            return None;
        }
        let persisted = load_geometry(&mut self.store);
        let viewport = self.host.viewport();
        let handle = create_overlay(&mut self.document, viewport, &persisted, &self.settings);
        self.fitted_viewport = Some(viewport);

        let node = self.document.get_mut(OVERLAY_ID)?;
        if self.controllers.is_none() {
            self.controllers = Some(Controllers::attach(node, &self.config));
        }
        bridge::sync_checkboxes(node, &SettingsPatch::from_settings(&self.settings));
        tracing::debug!(outcome = ?handle.outcome, geometry = ?handle.geometry, "overlay shown");
        Some(handle)
    }

    /// Ends any gesture, saves the final geometry and removes the overlay.
    /// Does nothing when no overlay is mounted.
    pub fn hide(&mut self) {
        let Some(node) = self.document.get_mut(OVERLAY_ID) else {
            tracing::debug!("no overlay to hide");
            return;
        };
        if let Some(mut controllers) = self.controllers.take() {
            controllers.dispose(&mut self.host, node);
        }

        let geometry = Geometry::from_parts(node.geometry.position(), node.intended_size);
        if let Err(err) = save_final_geometry(&mut self.store, &geometry) {
            tracing::warn!(?err, "failed to save overlay geometry before removal");
        }
        self.document.remove(OVERLAY_ID);
        self.resize_pending = false;
        self.fitted_viewport = None;
        tracing::debug!(?geometry, "overlay removed");
    }

    /// Points the content frame at the chat for the current video. Pages
    /// without a video id keep whatever the frame already shows.
    pub fn update_content(&mut self) {
        if !self.document.contains(OVERLAY_ID) {
            tracing::debug!("no overlay mounted; content not updated");
            return;
        }
        let location = self.host.location();
        let Some(video_id) = extract_video_id(&location) else {
            tracing::debug!(%location, "no video id on page; chat source unchanged");
            return;
        };
        let source = resolve_source(&mut self.host, &video_id);
        if let Some(node) = self.document.get_mut(OVERLAY_ID) {
            apply_source(node, &source);
        }
    }

    /// The content frame finished loading.
    pub fn on_frame_loaded(&mut self) {
        let Some(node) = self.document.get_mut(OVERLAY_ID) else {
            return;
        };
        node.spinner_visible = false;
        bridge::apply_frame_chrome(&mut self.host, &self.settings);
    }

    pub fn on_fullscreen_change(&mut self, now: Instant) {
        if self.shut_down {
            return;
        }
        self.fullscreen.signal(now);
    }

    /// Runs work that was deferred by debouncing or throttling.
    pub fn tick(&mut self, now: Instant) {
        if self.shut_down {
            return;
        }
        if self.fullscreen.is_pending() {
            let sampled = self.host.is_fullscreen();
            if let Some(transition) = self.fullscreen.poll(now, sampled) {
                tracing::debug!(?transition, "fullscreen changed");
                self.reconcile_visibility();
            }
        }
        if let Some(drag) = self.controllers.as_mut().and_then(|c| c.drag.as_mut()) {
            drag.tick(now);
        }
        self.apply_window_resize(now);
    }

    /// Feeds a page mutation to the navigation watcher.
    pub fn on_page_mutation(&mut self) {
        if self.shut_down {
            return;
        }
        let location = self.host.location();
        let mut navigated = None;
        self.navigation
            .observe(&location, &mut |url: &str| navigated = Some(url.to_string()));
        if let Some(url) = navigated {
            self.on_navigate(&url);
        }
    }

    fn on_navigate(&mut self, url: &str) {
        tracing::debug!(url, "page navigated");
        let was_shown = self.is_shown();
        self.reconcile_visibility();
        if was_shown && self.is_shown() {
            self.update_content();
        }
    }

    /// Window resizes are coalesced; the latest one is applied on the
    /// leading edge of each throttle window and again from `tick`.
    pub fn on_window_resize(&mut self, now: Instant) {
        if self.shut_down || !self.document.contains(OVERLAY_ID) {
            return;
        }
        self.resize_pending = true;
        self.apply_window_resize(now);
    }

    fn apply_window_resize(&mut self, now: Instant) {
        if !self.resize_pending {
            return;
        }
        if self.active_gesture().is_some() || !self.host.is_fullscreen() {
            return;
        }
        if !self.resize_throttle.ready(now) {
            return;
        }
        self.resize_pending = false;

        let viewport = self.host.viewport();
        if self.fitted_viewport == Some(viewport) {
            tracing::trace!(?viewport, "viewport unchanged; overlay left in place");
            return;
        }
        let Some(node) = self.document.get_mut(OVERLAY_ID) else {
            return;
        };
        self.fitted_viewport = Some(viewport);
        if node.minimized {
            controls::minimize(node, viewport);
        } else {
            let intended = Geometry::from_parts(node.geometry.position(), node.intended_size);
            node.geometry = reconcile(intended, viewport);
        }
        tracing::debug!(?viewport, geometry = ?node.geometry, "overlay refitted to viewport");
    }

    /// Starts a drag or resize. Presses are refused while another gesture
    /// is running.
    pub fn on_pointer_down(&mut self, event: PointerEvent) -> bool {
        let (Some(controllers), Some(node)) =
            (self.controllers.as_mut(), self.document.get_mut(OVERLAY_ID))
        else {
            return false;
        };
        if let Some(kind) = controllers.active_gesture() {
            tracing::debug!(?kind, "gesture already running; press ignored");
            return false;
        }
        match event.target {
            PointerTarget::Header => match controllers.drag.as_mut() {
                Some(drag) => drag.on_pointer_down(node, &event),
                None => false,
            },
            PointerTarget::ResizeHandle(direction) => match controllers.resize.as_mut() {
                Some(resize) => resize.on_pointer_down(&mut self.host, node, &event, direction),
                None => false,
            },
            _ => false,
        }
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent) -> bool {
        let (Some(controllers), Some(node)) =
            (self.controllers.as_mut(), self.document.get_mut(OVERLAY_ID))
        else {
            return false;
        };
        if let Some(drag) = controllers.drag.as_mut() {
            if drag.on_pointer_move(&mut self.host, node, &event) {
                return true;
            }
        }
        match controllers.resize.as_mut() {
            Some(resize) => resize.on_pointer_move(&mut self.host, node, &event),
            None => false,
        }
    }

    pub fn on_pointer_up(&mut self, event: PointerEvent) {
        self.end_gestures(Some(event.pointer), "pointer released");
    }

    pub fn on_pointer_cancel(&mut self, event: PointerEvent) {
        self.end_gestures(Some(event.pointer), "pointer cancelled");
    }

    /// Focus left the window; nothing will deliver the release.
    pub fn on_window_blur(&mut self) {
        self.end_gestures(None, "window blurred");
    }

    /// Finishes gestures owned by `pointer`, or every gesture when `None`,
    /// and persists what they produced.
    fn end_gestures(&mut self, pointer: Option<PointerId>, reason: &'static str) {
        let Some(controllers) = self.controllers.as_mut() else {
            return;
        };
        let mut node = self.document.get_mut(OVERLAY_ID);
        let owns = |owner: Option<PointerId>| owner.is_some() && (pointer.is_none() || owner == pointer);

        if let Some(drag) = controllers.drag.as_mut() {
            if owns(drag.pointer()) {
                if let Some(position) = drag.finish(&mut self.host, node.as_deref_mut()) {
                    tracing::debug!(reason, ?position, "drag ended");
                    if let Err(err) = save_position(&mut self.store, position) {
                        tracing::warn!(?err, "failed to save overlay position");
                    }
                }
            }
        }
        if let Some(resize) = controllers.resize.as_mut() {
            if owns(resize.pointer()) {
                if let Some(outcome) = resize.finish(&mut self.host, node.as_deref_mut()) {
                    tracing::debug!(reason, ?outcome, "resize ended");
                    let geometry = Geometry::from_parts(outcome.geometry.position(), outcome.intended);
                    if let Err(err) = save_geometry(&mut self.store, &geometry) {
                        tracing::warn!(?err, "failed to save overlay geometry");
                    }
                }
            }
        }
    }

    /// Escape ends a gesture, or else closes the settings panel. Arrow keys
    /// on the focused header nudge the overlay.
    pub fn on_key(&mut self, event: KeyEvent) -> KeyOutcome {
        if event.key == Key::Escape {
            if self.active_gesture().is_some() {
                self.end_gestures(None, "escape");
                return KeyOutcome::Handled;
            }
            let closed = self
                .document
                .get_mut(OVERLAY_ID)
                .is_some_and(|node| controls::set_panel_open(node, false));
            return if closed {
                KeyOutcome::Handled
            } else {
                KeyOutcome::Ignored
            };
        }

        let viewport = self.host.viewport();
        let (Some(controllers), Some(node)) =
            (self.controllers.as_ref(), self.document.get_mut(OVERLAY_ID))
        else {
            return KeyOutcome::Ignored;
        };
        if controllers.active_gesture().is_some() {
            return KeyOutcome::Ignored;
        }
        let Some(keyboard) = controllers.keyboard.as_ref() else {
            return KeyOutcome::Ignored;
        };
        let outcome = keyboard.handle(node, &event, viewport);
        if let KeyOutcome::Moved(position) = outcome {
            if let Err(err) = save_position(&mut self.store, position) {
                tracing::warn!(?err, "failed to save overlay position");
            }
        }
        outcome
    }

    /// Click on an overlay control. Returns whether it did anything.
    pub fn on_click(&mut self, target: PointerTarget) -> bool {
        let (Some(controllers), Some(node)) =
            (self.controllers.as_ref(), self.document.get_mut(OVERLAY_ID))
        else {
            return false;
        };
        let Some(bindings) = controllers.controls.as_ref() else {
            return false;
        };
        let action = bindings.on_click(node, target);
        tracing::debug!(?target, ?action, "overlay click");

        match action {
            ControlAction::ToggleMinimize => self.toggle_minimize(),
            ControlAction::Close => self.hide(),
            ControlAction::SetToggle(key, value) => {
                let patch = SettingsPatch::toggle(key, value);
                if let Err(err) = save_settings_patch(&mut self.store, &patch) {
                    tracing::warn!(?err, key = key.storage_key(), "failed to save setting");
                }
                self.apply_settings(&patch);
            }
            ControlAction::OpenSettings | ControlAction::CloseSettings => {}
            ControlAction::None => return false,
        }
        true
    }

    fn toggle_minimize(&mut self) {
        let viewport = self.host.viewport();
        let Some(node) = self.document.get_mut(OVERLAY_ID) else {
            return;
        };
        let saved = if node.minimized {
            let size = node.intended_size;
            controls::restore(node, size, viewport);
            save_minimized_state(&mut self.store, false, None)
        } else {
            let restore_to = controls::minimize(node, viewport);
            save_minimized_state(&mut self.store, true, Some(restore_to))
        };
        if let Err(err) = saved {
            tracing::warn!(?err, "failed to save minimized state");
        }
    }

    /// Merges a settings change into the live state and the overlay. Changes
    /// to `autoShowFullscreen` take effect immediately.
    pub fn apply_settings(&mut self, patch: &SettingsPatch) {
        if patch.is_empty() {
            return;
        }
        self.settings.apply(patch);
        if let Some(node) = self.document.get_mut(OVERLAY_ID) {
            bridge::apply_patch(&mut self.host, node, &self.settings, patch);
        }
        self.reconcile_visibility();
    }

    pub fn attach_inbox(&mut self, inbox: MessageInbox) {
        self.inbox = Some(inbox);
    }

    /// Drains pending messages, answering each. Returns how many were
    /// handled.
    pub fn pump_messages(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let poll = match self.inbox.as_ref() {
                Some(inbox) => inbox.poll(),
                None => break,
            };
            match poll {
                InboxPoll::Message(envelope) => {
                    let response = self.handle_message(&envelope.message);
                    envelope.respond(response);
                    handled += 1;
                }
                InboxPoll::Empty => break,
                InboxPoll::Disconnected => {
                    tracing::info!("message channel closed");
                    self.inbox = None;
                    break;
                }
            }
        }
        handled
    }

    pub fn handle_message(&mut self, message: &ExtensionMessage) -> ExtensionResponse {
        match message {
            ExtensionMessage::UpdateSettings { settings } => {
                tracing::debug!(keys = ?settings.keys(), "settings update received");
                self.apply_settings(settings);
                ExtensionResponse::ack()
            }
            ExtensionMessage::GetStatus => ExtensionResponse::Status(self.status()),
        }
    }

    /// Handles a raw message. Malformed ones are logged and get no reply.
    pub fn handle_json(&mut self, json: &str) -> Option<ExtensionResponse> {
        match ExtensionMessage::from_json(json) {
            Ok(message) => Some(self.handle_message(&message)),
            Err(err) => {
                tracing::warn!(?err, "ignoring malformed message");
                None
            }
        }
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            overlay_active: self.is_shown(),
            video_id: extract_video_id(&self.host.location()),
            is_fullscreen: self.host.is_fullscreen(),
        }
    }

    /// Page is unloading: save and remove the overlay, stop every watcher.
    /// Later events are ignored.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.hide();
        self.fullscreen.cancel();
        self.navigation.disconnect();
        self.inbox = None;
        self.wants_overlay = false;
        self.shut_down = true;
        tracing::debug!("overlay manager shut down");
    }
}
