//! End-to-end resize delivery through the headless hosts.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use stardust_core::{Dimension, DimensionSource};
use stardust_runtime::{
    FramePhase, FrameScheduler, HeadlessFrameClock, HeadlessLayout, SizeObserver,
};

const FRAME: Duration = Duration::from_millis(16);

fn hosts() -> (Rc<HeadlessLayout>, Rc<HeadlessFrameClock>, SizeObserver) {
    let layout = Rc::new(HeadlessLayout::new());
    let clock = Rc::new(HeadlessFrameClock::new());
    let observer = SizeObserver::new(layout.clone(), clock.clone());
    (layout, clock, observer)
}

#[test]
fn paint_phase_sees_size_delivered_in_same_frame() {
    let (layout, clock, observer) = hosts();
    let id = layout.mount(Dimension::new(300.0, 200.0));
    let handle = observer.attach(id).unwrap();
    let probe = handle.dimension_source();

    let painted = Rc::new(RefCell::new(Vec::new()));
    let p = Rc::clone(&painted);
    clock.request_frame(
        FramePhase::Paint,
        Box::new(move |_| p.borrow_mut().push(probe.dimension())),
    );
    clock.step(FRAME);

    assert_eq!(*painted.borrow(), vec![Dimension::new(300.0, 200.0)]);
}

#[test]
fn unmounting_container_delivers_zero_then_nothing() {
    let (layout, clock, observer) = hosts();
    let id = layout.mount(Dimension::new(50.0, 50.0));
    let handle = observer.attach(id).unwrap();
    clock.step(FRAME);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    handle.on_change(move |d| s.borrow_mut().push(d));

    layout.unmount(id);
    clock.step(FRAME);
    clock.step(FRAME);
    assert_eq!(*seen.borrow(), vec![Dimension::ZERO]);
    assert_eq!(handle.current_dimension(), Dimension::ZERO);
}

#[test]
fn attach_after_unmount_fails() {
    let (layout, _clock, observer) = hosts();
    let id = layout.mount(Dimension::new(1.0, 1.0));
    layout.unmount(id);
    assert!(observer.attach(id).is_err());
}

#[test]
fn resize_made_inside_callback_reaches_other_container() {
    let (layout, clock, observer) = hosts();
    let a = layout.mount(Dimension::new(100.0, 100.0));
    let b = layout.mount(Dimension::new(100.0, 100.0));
    let ha = observer.attach(a).unwrap();
    let hb = observer.attach(b).unwrap();
    clock.step(FRAME);

    let reflow = Rc::clone(&layout);
    ha.on_change(move |_| {
        reflow.resize(b, Dimension::new(250.0, 100.0));
    });
    let seen_b = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen_b);
    hb.on_change(move |d| s.borrow_mut().push(d));

    layout.resize(a, Dimension::new(600.0, 200.0));
    clock.run_frames(5, FRAME);

    assert_eq!(ha.current_dimension(), Dimension::new(600.0, 200.0));
    assert_eq!(hb.current_dimension(), Dimension::new(250.0, 100.0));
    assert_eq!(*seen_b.borrow(), vec![Dimension::new(250.0, 100.0)]);
    assert_eq!(observer.pending_count(), 0);
}

#[test]
fn callback_clamping_its_own_container_settles() {
    let (layout, clock, observer) = hosts();
    let id = layout.mount(Dimension::new(100.0, 100.0));
    let handle = observer.attach(id).unwrap();
    clock.step(FRAME);

    let clamp = Rc::clone(&layout);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    handle.on_change(move |d| {
        s.borrow_mut().push(d);
        if d.width() > 400.0 {
            clamp.resize(id, Dimension::new(400.0, d.height()));
        }
    });

    layout.resize(id, Dimension::new(900.0, 120.0));
    clock.run_frames(4, FRAME);

    assert_eq!(handle.current_dimension(), Dimension::new(400.0, 120.0));
    assert_eq!(
        *seen.borrow(),
        vec![Dimension::new(900.0, 120.0), Dimension::new(400.0, 120.0)]
    );
    assert_eq!(clock.pending_count(), 0);
}

proptest! {
    #[test]
    fn at_most_one_callback_per_frame_with_final_value(
        bursts in prop::collection::vec(
            prop::collection::vec((0u16..800, 0u16..600), 0..6),
            1..8,
        )
    ) {
        let (layout, clock, observer) = hosts();
        let id = layout.mount(Dimension::new(100.0, 100.0));
        let handle = observer.attach(id).unwrap();
        clock.step(FRAME);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        handle.on_change(move |d| s.borrow_mut().push(d));

        for burst in bursts {
            let before_size = handle.current_dimension();
            let before_calls = seen.borrow().len();
            for (w, h) in &burst {
                layout.resize(id, Dimension::new(f64::from(*w), f64::from(*h)));
            }
            clock.step(FRAME);

            let calls = seen.borrow().len() - before_calls;
            prop_assert!(calls <= 1);
            let expected = burst
                .last()
                .map_or(before_size, |(w, h)| Dimension::new(f64::from(*w), f64::from(*h)));
            prop_assert_eq!(handle.current_dimension(), expected);
            prop_assert_eq!(calls == 1, expected != before_size);
        }
    }
}
