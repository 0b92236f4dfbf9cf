#![forbid(unsafe_code)]

//! Stardust fund card public facade.
//!
//! Re-exports the types most applications need from the internal crates,
//! a [`HeadlessHost`] for driving cards without a real UI host, and the
//! file-based [`StardustConfig`].

pub mod config;
mod headless;

// --- Core re-exports -------------------------------------------------------

pub use stardust_core::{ContainerId, Dimension, DimensionSource, Rect, Sides};

// --- Render re-exports -----------------------------------------------------

pub use stardust_render::{BorderChars, Buffer, Cell, CellAttrs, PackedRgba};

// --- Runtime re-exports ----------------------------------------------------

pub use stardust_runtime::{
    AttachmentError, FramePhase, FrameScheduler, HeadlessFrameClock, HeadlessLayout, LayoutHost,
    ObservationHandle, SharedRegistry, SizeObserver,
};

// --- Effects re-exports ----------------------------------------------------

pub use stardust_fx::{
    AnimationHandle, AnimatorParams, ParticleAnimator, StardustFrame, StardustPalette, StartError,
};

// --- Widget re-exports -----------------------------------------------------

pub use stardust_widgets::{
    AnimationStatus, CardRuntime, CardStyle, DisabledReason, FundCard, FundDescriptor, FundKind,
    Panel, Widget,
};

pub use config::{ConfigError, StardustConfig};
pub use headless::HeadlessHost;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for stardust applications.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Attach(#[from] AttachmentError),
    #[error(transparent)]
    Start(#[from] StartError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Standard result type for stardust APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnimationStatus, Buffer, CardStyle, Dimension, Error, FundCard, FundDescriptor, FundKind,
        HeadlessHost, Rect, Result, StardustConfig, StardustPalette, Widget,
    };

    pub use crate::{core, fx, render, runtime, widgets};
}

pub use stardust_core as core;
pub use stardust_fx as fx;
pub use stardust_render as render;
pub use stardust_runtime as runtime;
pub use stardust_widgets as widgets;
