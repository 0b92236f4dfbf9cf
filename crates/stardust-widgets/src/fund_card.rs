#![forbid(unsafe_code)]

//! The fund card: a panel with fund text over a stardust particle field.
//!
//! # Lifecycle
//!
//! ```text
//! mount:   attach SizeObserver ─► lease atlas ─► start ParticleAnimator
//! unmount: stop animator ─► detach observer ─► release atlas
//! ```
//!
//! A mount failure never propagates: it is logged, the card reports
//! [`AnimationStatus::Disabled`], and rendering falls back to text only.

use std::fmt;
use std::rc::Rc;

use stardust_core::ContainerId;
use stardust_core::geometry::{Rect, Sides};
use stardust_fx::{AnimationHandle, AnimatorParams, ParticleAnimator, SpriteAtlas, StartError};
use stardust_render::{BorderChars, Buffer, Cell, CellAttrs, PackedRgba};
use stardust_runtime::{
    AttachmentError, FrameScheduler, Lease, ObservationHandle, SharedRegistry, SizeObserver,
};
use tracing::{debug, warn};

use crate::fund::FundDescriptor;
use crate::panel::Panel;
use crate::particle_layer::ParticleLayer;
use crate::text::wrap;
use crate::Widget;

/// Visual settings for a card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardStyle {
    /// Logical pixels per terminal column.
    pub cell_width: f64,
    /// Logical pixels per terminal row.
    pub cell_height: f64,
    pub border: BorderChars,
    /// Space between border and text. The particle field ignores it.
    pub padding: Sides,
    pub border_fg: PackedRgba,
    pub category_fg: PackedRgba,
    pub title_fg: PackedRgba,
    pub text_fg: PackedRgba,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
            border: BorderChars::ROUNDED,
            padding: Sides::symmetric(0, 1),
            border_fg: PackedRgba::rgb(150, 140, 200),
            category_fg: PackedRgba::rgb(200, 190, 255),
            title_fg: PackedRgba::WHITE,
            text_fg: PackedRgba::rgb(210, 210, 220),
        }
    }
}

/// Why the particle field is not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DisabledReason {
    #[error("size observation failed: {0}")]
    Attach(#[from] AttachmentError),
    #[error("animation failed to start: {0}")]
    Start(#[from] StartError),
}

/// Whether a card's animation is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationStatus {
    /// Never mounted, or unmounted.
    #[default]
    Unmounted,
    Running,
    /// Mounted, text only.
    Disabled(DisabledReason),
}

/// Host services a card needs to mount.
#[derive(Clone)]
pub struct CardRuntime {
    pub observer: SizeObserver,
    pub scheduler: Rc<dyn FrameScheduler>,
}

impl fmt::Debug for CardRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRuntime")
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}

struct Mounted {
    container: ContainerId,
    animation: AnimationHandle,
    observation: ObservationHandle,
    atlas: Lease<SpriteAtlas>,
}

/// A fund card widget.
pub struct FundCard {
    fund: FundDescriptor,
    style: CardStyle,
    params: AnimatorParams,
    mounted: Option<Mounted>,
    status: AnimationStatus,
}

impl FundCard {
    pub fn new(fund: FundDescriptor) -> Self {
        Self {
            fund,
            style: CardStyle::default(),
            params: AnimatorParams::default(),
            mounted: None,
            status: AnimationStatus::Unmounted,
        }
    }

    #[must_use]
    pub fn style(mut self, style: CardStyle) -> Self {
        self.style = style;
        self
    }

    /// Particle parameters used at the next mount.
    #[must_use]
    pub fn params(mut self, params: AnimatorParams) -> Self {
        self.params = params;
        self
    }

    pub fn fund(&self) -> &FundDescriptor {
        &self.fund
    }

    pub fn status(&self) -> AnimationStatus {
        self.status
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// The running animation, if any.
    pub fn animation(&self) -> Option<&AnimationHandle> {
        self.mounted.as_ref().map(|m| &m.animation)
    }

    /// The size observation, if mounted.
    pub fn observation(&self) -> Option<&ObservationHandle> {
        self.mounted.as_ref().map(|m| &m.observation)
    }

    /// Bind the card to `container` and start the particle field.
    ///
    /// Remounts if already mounted. Failures disable the animation instead
    /// of returning an error.
    pub fn mount(&mut self, container: ContainerId, runtime: &CardRuntime) -> AnimationStatus {
        self.unmount();
        self.status = match self.try_mount(container, runtime) {
            Ok(mounted) => {
                debug!(container = %container, title = %self.fund.title, "fund card mounted");
                self.mounted = Some(mounted);
                AnimationStatus::Running
            }
            Err(reason) => {
                warn!(
                    container = %container,
                    title = %self.fund.title,
                    error = %reason,
                    "fund card animation disabled"
                );
                AnimationStatus::Disabled(reason)
            }
        };
        self.status
    }

    fn try_mount(
        &self,
        container: ContainerId,
        runtime: &CardRuntime,
    ) -> Result<Mounted, DisabledReason> {
        let observation = runtime.observer.attach(container)?;
        let palette = self.params.palette;
        let atlas = SharedRegistry::acquire(&SpriteAtlas::registry_key(palette), || {
            SpriteAtlas::new(palette)
        });
        let animation =
            ParticleAnimator::new(Rc::clone(&runtime.scheduler), self.params.clone())
                .with_source(observation.dimension_source())
                .with_atlas(atlas.shared())
                .start()?;
        Ok(Mounted {
            container,
            animation,
            observation,
            atlas,
        })
    }

    /// Stop the animation, then release the observation. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.animation.stop();
            mounted.observation.detach();
            debug!(
                container = %mounted.container,
                frames = mounted.animation.frames_rendered(),
                "fund card unmounted"
            );
            drop(mounted.atlas);
        }
        self.status = AnimationStatus::Unmounted;
    }
}

impl Drop for FundCard {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for FundCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundCard")
            .field("fund", &self.fund)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Widget for FundCard {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let body = CardBody { card: self, panel: area };
        Panel::new(body)
            .border_chars(self.style.border)
            .border_fg(self.style.border_fg)
            .render(area, buf);
    }
}

/// Everything inside the border.
struct CardBody<'a> {
    card: &'a FundCard,
    panel: Rect,
}

impl CardBody<'_> {
    fn render_text(&self, area: Rect, buf: &mut Buffer, bg: PackedRgba) {
        let style = &self.card.style;
        let fund = &self.card.fund;
        let text_area = area.inner(style.padding);
        if text_area.is_empty() {
            return;
        }

        let mut lines: Vec<(String, Cell)> = vec![
            (
                fund.category_line(),
                Cell::default().with_fg(style.category_fg).with_bg(bg),
            ),
            (String::new(), Cell::default()),
            (
                fund.title.clone(),
                Cell::default()
                    .with_fg(style.title_fg)
                    .with_bg(bg)
                    .with_attrs(CellAttrs::BOLD),
            ),
            (String::new(), Cell::default()),
        ];
        let body = Cell::default().with_fg(style.text_fg).with_bg(bg);
        lines.extend(
            wrap(fund.description_text(), usize::from(text_area.width))
                .into_iter()
                .map(|line| (line, body)),
        );

        let max_x = text_area.right();
        for (row, (text, cell)) in (text_area.y..text_area.bottom()).zip(&lines) {
            buf.print_text_clipped(text_area.x, row, text, *cell, max_x);
        }
    }
}

impl Widget for CardBody<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let style = &self.card.style;
        let mut bg = PackedRgba::TRANSPARENT;
        if let Some(mounted) = &self.card.mounted {
            bg = mounted.atlas.background();
            mounted.animation.with_frame(|frame| match frame {
                Some(frame) => ParticleLayer::new(frame, style.cell_width, style.cell_height)
                    .origin(self.panel.x, self.panel.y)
                    .background(bg)
                    .render(area, buf),
                None => buf.fill(area, Cell::from_char(' ').with_bg(bg)),
            });
        }
        self.render_text(area, buf, bg);
    }
}
