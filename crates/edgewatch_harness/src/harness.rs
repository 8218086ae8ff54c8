//! Widget driver over [`SimHost`]
//!
//! Plays the browser's part: delivers queued observer callbacks and attribute
//! echoes, advances frames, and records every notification the widget emits.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use edgewatch_core::{event_name, event_types, Event, EventType};
use edgewatch_platform::{ElementTree, OverflowY, PointerInput, PointerResponse};
use edgewatch_widgets::{InfiniteScrollList, ScrollCompletion, WidgetConfig};

use crate::assert::WidgetSnapshot;
use crate::sim_host::{DocumentSpec, Role, SimHost};

/// Upper bound on callback rounds per pump
const MAX_PUMP_ROUNDS: usize = 64;

/// Default frame interval in milliseconds
pub const DEFAULT_TICK_MS: f64 = 16.0;

pub struct Harness {
    list: InfiniteScrollList<SimHost>,
    events: Rc<RefCell<Vec<Event>>>,
    tick_ms: f64,
    frames: u64,
}

impl Harness {
    /// Build the host, connect the widget and deliver the initial reports
    pub fn new(document: &DocumentSpec, config: WidgetConfig) -> Self {
        let host = SimHost::new(document);
        let element = host.widget_element();
        let mut list = InfiniteScrollList::new(host, element, config);

        let events = Rc::new(RefCell::new(Vec::new()));
        for event_type in event_types::ALL {
            let sink = Rc::clone(&events);
            list.on_event(event_type, move |event: &Event| {
                sink.borrow_mut().push(event.clone());
            });
        }

        let mut harness = Self {
            list,
            events,
            tick_ms: DEFAULT_TICK_MS,
            frames: 0,
        };
        harness.list.connected();
        harness.pump();
        harness
    }

    pub fn with_tick_ms(mut self, tick_ms: f64) -> Self {
        self.tick_ms = tick_ms.max(1.0);
        self
    }

    /// Deliver queued attribute echoes, resize and intersection reports until
    /// the host goes quiet.
    pub fn pump(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            if !self.list.host().has_pending() {
                return;
            }
            for echo in self.list.host_mut().take_echoes() {
                self.list
                    .attribute_changed(&echo.name, echo.old.as_deref(), echo.new.as_deref());
            }
            for id in self.list.host_mut().take_resizes() {
                self.list.on_resize(id);
            }
            for (id, is_intersecting) in self.list.host_mut().take_reports() {
                self.list.on_intersection(id, is_intersecting);
            }
        }
        tracing::warn!("host still busy after {} callback rounds", MAX_PUMP_ROUNDS);
    }

    /// One animation frame
    pub fn frame(&mut self) {
        self.list.host_mut().advance(self.tick_ms);
        self.pump();
        let now = self.list.host().now();
        self.list.on_animation_frame(now);
        self.pump();
        self.frames += 1;
    }

    pub fn run_frames(&mut self, frames: u32) {
        for _ in 0..frames {
            self.frame();
        }
    }

    /// Run frames until at least `ms` has passed
    pub fn wait(&mut self, ms: f64) {
        let target = self.list.host().now() + ms;
        while self.list.host().now() < target {
            self.frame();
        }
    }

    // ========================================================================
    // Page actions
    // ========================================================================

    pub fn scroll_to(&mut self, top: f32) {
        self.list.host_mut().scroll_to(top);
        self.pump();
    }

    /// Attribute write by the page, followed by the change callback
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        let old = self.list.host_mut().set_attribute(name, value);
        self.list.attribute_changed(name, old.as_deref(), value);
        self.pump();
    }

    pub fn set_overflow(&mut self, role: Role, overflow: OverflowY) {
        self.list.host_mut().set_overflow(role, overflow);
    }

    pub fn resize_parent(&mut self) {
        self.list.host_mut().notify_resize();
        self.pump();
    }

    pub fn set_content_height(&mut self, height: f32) {
        self.list.host_mut().set_content_height(height);
        self.list.host_mut().notify_resize();
        self.pump();
    }

    /// Touch input only reaches the widget where its listeners are attached
    fn deliver(&mut self, input: PointerInput) -> PointerResponse {
        let attached = self
            .list
            .listener_target()
            .is_some_and(|target| self.list.host().listeners().contains(&target));
        if !attached {
            return PointerResponse::default();
        }
        let response = self.list.on_pointer(input);
        self.pump();
        response
    }

    pub fn touch_start(&mut self, y: f32) -> PointerResponse {
        self.deliver(PointerInput::down(y))
    }

    pub fn touch_move(&mut self, y: f32) -> PointerResponse {
        self.deliver(PointerInput::moved(y))
    }

    pub fn touch_end(&mut self) -> PointerResponse {
        self.deliver(PointerInput::up())
    }

    pub fn touch_cancel(&mut self) -> PointerResponse {
        self.deliver(PointerInput::cancel())
    }

    pub fn scroll_to_top(&mut self) -> ScrollCompletion {
        let completion = self.list.scroll_to_top();
        self.pump();
        completion
    }

    pub fn scroll_to_top_and_refresh(&mut self) -> ScrollCompletion {
        let completion = self.list.scroll_to_top_and_refresh();
        self.pump();
        completion
    }

    pub fn disconnect(&mut self) {
        self.list.disconnected();
        self.pump();
    }

    pub fn reconnect(&mut self) {
        self.list.connected();
        self.pump();
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn event_count(&self, event_type: EventType) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.event_type == event_type)
            .count()
    }

    pub fn clear_events(&mut self) {
        self.events.borrow_mut().clear();
    }

    pub fn event_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = event_types::ALL
            .into_iter()
            .map(|ty| (event_name(ty).to_string(), 0))
            .collect();
        for event in self.events.borrow().iter() {
            *counts.entry(event.name().to_string()).or_default() += 1;
        }
        counts
    }

    pub fn list(&self) -> &InfiniteScrollList<SimHost> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut InfiniteScrollList<SimHost> {
        &mut self.list
    }

    pub fn host(&self) -> &SimHost {
        self.list.host()
    }

    pub fn now_ms(&self) -> f64 {
        self.list.host().now()
    }

    pub fn elapsed_frames(&self) -> u64 {
        self.frames
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        let host = self.list.host();
        WidgetSnapshot {
            events: self.event_counts(),
            affordance_height: self.list.affordance().height_px,
            phase: self.list.refresh_phase().name().to_string(),
            attributes: host.attributes().clone(),
            scroll_top: host.scroll_top(self.list.scroll_root()),
            footer: self.list.footer_slot().name().to_string(),
        }
    }
}
