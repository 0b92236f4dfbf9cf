#![forbid(unsafe_code)]

//! Mount/unmount lifecycle of a fund card against headless hosts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stardust_core::{ContainerId, Dimension};
use stardust_fx::{AnimatorParams, SpriteAtlas, StardustPalette};
use stardust_render::Buffer;
use stardust_runtime::{
    HeadlessFrameClock, HeadlessLayout, SharedRegistry, SizeObserver,
};
use stardust_widgets::{
    AnimationStatus, CardRuntime, DisabledReason, FundCard, FundDescriptor, Widget,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

const FRAME: Duration = Duration::from_millis(16);

/// Records `(target, message)` for every event, in order.
#[derive(Clone, Default)]
struct EventLog {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

impl EventLog {
    fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.iter().map(|(_, m)| m.clone()).collect())
            .unwrap_or_default()
    }

    fn position(&self, message: &str) -> Option<usize> {
        self.messages().iter().position(|m| m == message)
    }

    fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or_default()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        if let Ok(mut events) = self.events.lock() {
            events.push((event.metadata().target().to_owned(), visitor.0));
        }
    }
}

struct Host {
    layout: Rc<HeadlessLayout>,
    clock: Rc<HeadlessFrameClock>,
    runtime: CardRuntime,
}

impl Host {
    fn new() -> Self {
        let layout = Rc::new(HeadlessLayout::new());
        let clock = Rc::new(HeadlessFrameClock::new());
        let runtime = CardRuntime {
            observer: SizeObserver::new(layout.clone(), clock.clone()),
            scheduler: clock.clone(),
        };
        Self {
            layout,
            clock,
            runtime,
        }
    }
}

fn rust_fund() -> FundDescriptor {
    FundDescriptor::new("Project", "Rust Foundation", "Keeps the lights on.")
}

#[test]
fn resize_is_coalesced_and_regenerates_next_frame() {
    let host = Host::new();
    let container = host.layout.mount(Dimension::new(300.0, 200.0));
    let mut card = FundCard::new(rust_fund());
    assert_eq!(card.mount(container, &host.runtime), AnimationStatus::Running);
    host.clock.step(FRAME);

    let seen = Rc::new(RefCell::new(Vec::new()));
    if let Some(observation) = card.observation() {
        let seen = Rc::clone(&seen);
        observation.on_change(move |d| seen.borrow_mut().push(d));
    }

    host.layout.resize(container, Dimension::new(450.0, 200.0));
    host.layout.resize(container, Dimension::new(600.0, 200.0));
    host.clock.step(FRAME);

    assert_eq!(*seen.borrow(), vec![Dimension::new(600.0, 200.0)]);
    let current = card.observation().map(|o| o.current_dimension());
    assert_eq!(current, Some(Dimension::new(600.0, 200.0)));

    let animation = card.animation();
    assert_eq!(animation.map(|a| a.particle_count()), Some(48));
    let frame_dim = animation.and_then(|a| a.with_frame(|f| f.map(|f| f.dimension)));
    assert_eq!(frame_dim, Some(Dimension::new(600.0, 200.0)));
}

#[test]
fn unmount_stops_animation_before_detaching() {
    let log = EventLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());

    tracing::subscriber::with_default(subscriber, || {
        let host = Host::new();
        let container = host.layout.mount(Dimension::new(300.0, 200.0));
        let mut card = FundCard::new(rust_fund());
        card.mount(container, &host.runtime);
        host.clock.run_frames(3, FRAME);

        let callbacks = Rc::new(Cell::new(0_u32));
        if let Some(observation) = card.observation() {
            let callbacks = Rc::clone(&callbacks);
            observation.on_change(move |_| callbacks.set(callbacks.get() + 1));
        }

        card.unmount();
        let stopped = log.position("stardust animation stopped");
        let detached = log.position("size observation detached");
        assert!(stopped.is_some() && detached.is_some(), "{:?}", log.messages());
        assert!(stopped < detached);

        let events_after_unmount = log.len();
        host.layout.resize(container, Dimension::new(900.0, 300.0));
        host.clock.run_frames(5, FRAME);

        assert_eq!(callbacks.get(), 0);
        assert_eq!(host.clock.pending_count(), 0);
        assert_eq!(host.runtime.observer.observation_count(), 0);
        assert_eq!(log.len(), events_after_unmount, "{:?}", log.messages());
    });
}

#[test]
fn unmount_twice_is_unmount_once() {
    let host = Host::new();
    let container = host.layout.mount(Dimension::new(300.0, 200.0));
    let mut card = FundCard::new(rust_fund());
    card.mount(container, &host.runtime);
    card.unmount();
    card.unmount();
    assert_eq!(card.status(), AnimationStatus::Unmounted);
    assert_eq!(host.clock.pending_count(), 0);
}

#[test]
fn mount_then_unmount_without_frames_renders_nothing() {
    let host = Host::new();
    let container = host.layout.mount(Dimension::new(300.0, 200.0));
    let mut card = FundCard::new(rust_fund());
    card.mount(container, &host.runtime);
    let frames = card.animation().map(|a| a.frames_rendered());
    card.unmount();
    host.clock.run_frames(3, FRAME);
    assert_eq!(frames, Some(0));
    assert_eq!(host.clock.frame_index(), 3);
    assert_eq!(host.clock.pending_count(), 0);
}

#[test]
fn container_unmounted_by_host_degrades_card() {
    let host = Host::new();
    let container = host.layout.mount(Dimension::new(300.0, 200.0));
    host.layout.unmount(container);

    let mut card = FundCard::new(rust_fund());
    let status = card.mount(container, &host.runtime);
    assert!(matches!(
        status,
        AnimationStatus::Disabled(DisabledReason::Attach(_))
    ));

    let mut buf = Buffer::new(24, 7);
    card.render(buf.area(), &mut buf);
    let lines = buf.to_lines();
    assert!(lines[1].contains("Project 🚀"));
    assert!(lines[3].contains("Rust Foundation"));
    assert!(lines[5].contains("Keeps the lights on."));
}

#[test]
fn unknown_container_never_schedules_frames() {
    let host = Host::new();
    let mut card = FundCard::new(rust_fund());
    card.mount(ContainerId::new(7), &host.runtime);
    assert_eq!(host.clock.pending_count(), 0);
    assert!(card.animation().is_none());
}

#[test]
fn empty_description_shows_placeholder() {
    let card = FundCard::new(FundDescriptor::new("Mentorship", "Office hours", "  "));
    let mut buf = Buffer::new(30, 7);
    card.render(buf.area(), &mut buf);
    let lines = buf.to_lines();
    assert!(lines[1].contains("Mentorship 🫀"));
    assert!(lines[5].contains("No description provided"));
}

#[test]
fn zero_sized_container_has_no_particles() {
    let host = Host::new();
    let container = host.layout.mount(Dimension::ZERO);
    let mut card = FundCard::new(rust_fund());
    card.mount(container, &host.runtime);
    host.clock.run_frames(2, FRAME);
    let animation = card.animation();
    assert_eq!(animation.map(|a| a.particle_count()), Some(0));
    assert_eq!(animation.map(|a| a.frames_rendered()), Some(2));
}

#[test]
fn atlas_lives_while_any_card_is_mounted() {
    let host = Host::new();
    let container = host.layout.mount(Dimension::new(300.0, 200.0));
    let frost = AnimatorParams {
        palette: StardustPalette::Frost,
        ..AnimatorParams::default()
    };
    let key = SpriteAtlas::registry_key(StardustPalette::Frost);

    let mut cards: Vec<FundCard> = (0..3)
        .map(|_| FundCard::new(rust_fund()).params(frost.clone()))
        .collect();
    for card in &mut cards {
        card.mount(container, &host.runtime);
    }
    assert_eq!(SharedRegistry::lease_count::<SpriteAtlas>(&key), 3);

    cards.truncate(1);
    assert_eq!(SharedRegistry::lease_count::<SpriteAtlas>(&key), 1);
    cards.clear();
    assert_eq!(SharedRegistry::lease_count::<SpriteAtlas>(&key), 0);
}
