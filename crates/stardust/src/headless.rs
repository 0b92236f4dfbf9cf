#![forbid(unsafe_code)]

//! A layout host and frame clock wired together for cards.

use std::rc::Rc;
use std::time::Duration;

use stardust_core::{ContainerId, Dimension};
use stardust_render::Buffer;
use stardust_runtime::{HeadlessFrameClock, HeadlessLayout, SizeObserver};
use stardust_widgets::{CardRuntime, Widget};

/// In-memory host: containers live in a [`HeadlessLayout`], frames advance
/// only when [`step`](Self::step) is called.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub layout: Rc<HeadlessLayout>,
    pub clock: Rc<HeadlessFrameClock>,
    pub runtime: CardRuntime,
}

impl HeadlessHost {
    pub fn new() -> Self {
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

    /// Mount a container sized `cols x rows` cells.
    pub fn mount_cells(&self, cols: u16, rows: u16, cell_width: f64, cell_height: f64) -> ContainerId {
        self.layout
            .mount(Dimension::from_cells(cols, rows, cell_width, cell_height))
    }

    /// Run one frame.
    pub fn step(&self, delta: Duration) {
        self.clock.step(delta);
    }

    /// Render `widget` into a fresh `cols x rows` buffer.
    pub fn snapshot(&self, widget: &dyn Widget, cols: u16, rows: u16) -> Buffer {
        let mut buf = Buffer::new(cols, rows);
        widget.render(buf.area(), &mut buf);
        buf
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}
