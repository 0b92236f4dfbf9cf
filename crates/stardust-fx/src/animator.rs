#![forbid(unsafe_code)]

//! The stardust frame loop.
//!
//! [`ParticleAnimator::start`] schedules a `Paint`-phase callback that, each
//! frame, polls the dimension source once, advances the [`ParticleState`],
//! publishes a [`StardustFrame`], and re-requests itself.
//!
//! # Invariants
//!
//! 1. At most one frame request is pending per running animation.
//! 2. After [`AnimationHandle::stop`] no frame renders: the pending request
//!    is cancelled and a callback already queued checks the running flag.
//! 3. The scheduler only holds a weak reference to the loop, so dropping
//!    the handle always ends it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use stardust_core::{Dimension, DimensionSource};
use stardust_render::PackedRgba;
use stardust_runtime::{FramePhase, FrameRequestId, FrameScheduler, FrameTime};
use tracing::{debug, trace};

use crate::TRACE_TARGET;
use crate::palette::SpriteAtlas;
use crate::particles::{AnimatorParams, ParticleState};

/// One particle as drawn in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Center in logical pixels, relative to the container origin.
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    /// Twinkled brightness in `[0, 1]`.
    pub intensity: f64,
    pub color: PackedRgba,
    pub glyph: char,
}

/// Display list for one frame, ordered dimmest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StardustFrame {
    /// Scheduler frame index.
    pub index: u64,
    /// Dimension read for this frame.
    pub dimension: Dimension,
    pub sprites: Vec<Sprite>,
}

/// Why [`ParticleAnimator::start`] failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// No dimension source was supplied.
    #[error("no dimension source was supplied")]
    MissingSource,
}

/// Builder for a particle animation.
pub struct ParticleAnimator {
    scheduler: Rc<dyn FrameScheduler>,
    params: AnimatorParams,
    source: Option<Rc<dyn DimensionSource>>,
    atlas: Option<Rc<SpriteAtlas>>,
}

impl ParticleAnimator {
    /// Animator running on `scheduler`. Params are normalized.
    pub fn new(scheduler: Rc<dyn FrameScheduler>, params: AnimatorParams) -> Self {
        Self {
            scheduler,
            params: params.normalized(),
            source: None,
            atlas: None,
        }
    }

    /// Where each frame reads its dimension from.
    #[must_use]
    pub fn with_source(mut self, source: impl DimensionSource + 'static) -> Self {
        self.source = Some(Rc::new(source));
        self
    }

    /// Use a shared atlas instead of building one for the palette.
    #[must_use]
    pub fn with_atlas(mut self, atlas: Rc<SpriteAtlas>) -> Self {
        self.atlas = Some(atlas);
        self
    }

    pub fn params(&self) -> &AnimatorParams {
        &self.params
    }

    /// Begin the frame loop; the first frame renders at the next paint.
    pub fn start(self) -> Result<AnimationHandle, StartError> {
        let source = self.source.ok_or(StartError::MissingSource)?;
        let atlas = match self.atlas {
            Some(atlas) if atlas.palette() == self.params.palette => atlas,
            _ => Rc::new(SpriteAtlas::new(self.params.palette)),
        };
        let state = Rc::new(LoopState {
            scheduler: self.scheduler,
            source,
            atlas,
            params: self.params,
            running: Cell::new(true),
            pending: Cell::new(None),
            particles: RefCell::new(ParticleState::new()),
            frames_rendered: Cell::new(0),
            latest: RefCell::new(None),
        });
        LoopState::request_next(&state);
        debug!(
            target: TRACE_TARGET,
            palette = %state.params.palette,
            "stardust animation started"
        );
        Ok(AnimationHandle { state })
    }
}

impl fmt::Debug for ParticleAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleAnimator")
            .field("params", &self.params)
            .field("has_source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}

struct LoopState {
    scheduler: Rc<dyn FrameScheduler>,
    source: Rc<dyn DimensionSource>,
    atlas: Rc<SpriteAtlas>,
    params: AnimatorParams,
    running: Cell<bool>,
    pending: Cell<Option<FrameRequestId>>,
    particles: RefCell<ParticleState>,
    frames_rendered: Cell<u64>,
    latest: RefCell<Option<StardustFrame>>,
}

impl LoopState {
    fn request_next(this: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(this);
        let id = this.scheduler.request_frame(
            FramePhase::Paint,
            Box::new(move |time| {
                if let Some(state) = weak.upgrade() {
                    LoopState::render_frame(&state, time);
                }
            }),
        );
        this.pending.set(Some(id));
    }

    fn render_frame(this: &Rc<Self>, time: FrameTime) {
        this.pending.set(None);
        if !this.running.get() {
            return;
        }

        let dim = this.source.dimension();
        let frame = {
            let mut particles = this.particles.borrow_mut();
            if particles.advance(dim, time.delta, &this.params) {
                trace!(
                    target: TRACE_TARGET,
                    generation = particles.generation(),
                    particles = particles.particles().len(),
                    dimension = %dim,
                    "stardust regenerated"
                );
            }
            build_frame(time.index, dim, &particles, &this.atlas)
        };
        *this.latest.borrow_mut() = Some(frame);
        this.frames_rendered.set(this.frames_rendered.get() + 1);

        if this.running.get() {
            LoopState::request_next(this);
        }
    }
}

fn build_frame(index: u64, dim: Dimension, state: &ParticleState, atlas: &SpriteAtlas) -> StardustFrame {
    let mut sprites: Vec<Sprite> = state
        .particles()
        .iter()
        .map(|p| {
            let intensity = p.intensity();
            Sprite {
                x: p.x,
                y: p.y,
                radius: p.radius,
                intensity,
                color: atlas.color(p.hue, intensity),
                glyph: atlas.glyph(intensity),
            }
        })
        .collect();
    sprites.sort_by(|a, b| a.intensity.total_cmp(&b.intensity));
    StardustFrame {
        index,
        dimension: dim,
        sprites,
    }
}

/// Exclusive owner of a running animation. Dropping it stops the loop.
pub struct AnimationHandle {
    state: Rc<LoopState>,
}

impl AnimationHandle {
    /// Stop the loop. Calling it again has no effect.
    pub fn stop(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let Some(id) = self.state.pending.take() {
            self.state.scheduler.cancel_frame(id);
        }
        debug!(
            target: TRACE_TARGET,
            frames = self.state.frames_rendered.get(),
            "stardust animation stopped"
        );
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Frames rendered since start.
    pub fn frames_rendered(&self) -> u64 {
        self.state.frames_rendered.get()
    }

    /// Particle sets generated since start.
    pub fn regenerations(&self) -> u64 {
        self.state.particles.borrow().generation()
    }

    /// Particles in the current set.
    pub fn particle_count(&self) -> usize {
        self.state.particles.borrow().particles().len()
    }

    /// Borrow the most recent frame, if any has rendered.
    pub fn with_frame<R>(&self, f: impl FnOnce(Option<&StardustFrame>) -> R) -> R {
        f(self.state.latest.borrow().as_ref())
    }

    /// Clone of the most recent frame.
    pub fn latest_frame(&self) -> Option<StardustFrame> {
        self.state.latest.borrow().clone()
    }

    /// The atlas frames are colored with.
    pub fn atlas(&self) -> &SpriteAtlas {
        &self.state.atlas
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("running", &self.is_running())
            .field("frames_rendered", &self.frames_rendered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardust_runtime::HeadlessFrameClock;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    fn animator(clock: &Rc<HeadlessFrameClock>) -> ParticleAnimator {
        ParticleAnimator::new(clock.clone(), AnimatorParams::default())
    }

    #[test]
    fn start_without_source_fails() {
        let clock = Rc::new(HeadlessFrameClock::new());
        assert_eq!(animator(&clock).start().unwrap_err(), StartError::MissingSource);
        assert_eq!(clock.pending_count(), 0);
    }

    #[test]
    fn renders_one_frame_per_step() {
        let clock = Rc::new(HeadlessFrameClock::new());
        let handle = animator(&clock)
            .with_source(Dimension::new(300.0, 200.0))
            .start()
            .unwrap();
        assert_eq!(handle.frames_rendered(), 0);
        clock.run_frames(3, FRAME);
        assert_eq!(handle.frames_rendered(), 3);
        assert_eq!(handle.regenerations(), 1);
        assert_eq!(handle.particle_count(), 24);

        let frame = handle.latest_frame().unwrap();
        assert_eq!(frame.index, 3);
        assert_eq!(frame.sprites.len(), 24);
        assert!(frame.sprites.windows(2).all(|w| w[0].intensity <= w[1].intensity));
    }

    #[test]
    fn zero_dimension_renders_empty_frames() {
        let clock = Rc::new(HeadlessFrameClock::new());
        let handle = animator(&clock).with_source(Dimension::ZERO).start().unwrap();
        clock.run_frames(2, FRAME);
        assert_eq!(handle.frames_rendered(), 2);
        assert_eq!(handle.regenerations(), 0);
        handle.with_frame(|frame| assert!(frame.is_some_and(|f| f.sprites.is_empty())));
    }

    #[test]
    fn stop_is_idempotent_and_final() {
        let clock = Rc::new(HeadlessFrameClock::new());
        let handle = animator(&clock)
            .with_source(Dimension::new(50.0, 50.0))
            .start()
            .unwrap();
        clock.step(FRAME);
        handle.stop();
        handle.stop();
        assert_eq!(clock.pending_count(), 0);
        clock.run_frames(5, FRAME);
        assert_eq!(handle.frames_rendered(), 1);
        assert!(!handle.is_running());
    }

    #[test]
    fn dropping_handle_cancels_loop() {
        let clock = Rc::new(HeadlessFrameClock::new());
        let handle = animator(&clock)
            .with_source(Dimension::new(50.0, 50.0))
            .start()
            .unwrap();
        drop(handle);
        assert_eq!(clock.pending_count(), 0);
    }

    #[test]
    fn mismatched_atlas_is_replaced() {
        let clock = Rc::new(HeadlessFrameClock::new());
        let frost = Rc::new(SpriteAtlas::new(crate::StardustPalette::Frost));
        let handle = animator(&clock)
            .with_source(Dimension::ZERO)
            .with_atlas(frost)
            .start()
            .unwrap();
        assert_eq!(handle.atlas().palette(), crate::StardustPalette::Nebula);
    }

    #[test]
    #[tracing_test::traced_test]
    fn start_and_stop_are_logged() {
        let clock = Rc::new(HeadlessFrameClock::new());
        let handle = animator(&clock).with_source(Dimension::ZERO).start().unwrap();
        handle.stop();
        assert!(logs_contain("stardust animation started"));
        assert!(logs_contain("stardust animation stopped"));
    }
}
