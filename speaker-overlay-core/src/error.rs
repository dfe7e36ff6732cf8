use thiserror::Error;

/// All errors produced by speaker-overlay-core.
///
/// Only initialization and persistence can fail. Out-of-range inputs from
/// the stream feed or the user are clamped or dropped instead of surfaced.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("render device handle is null")]
    NullDevice,

    #[error("speaker overlay is already initialized")]
    AlreadyInitialized,

    #[error("GUI subsystem is not ready")]
    GuiNotReady,

    #[error("failed to create speaker icon texture: {0}")]
    IconTexture(String),

    #[error("failed to convert font size {base} to screen units")]
    FontSizeConversion { base: f32 },

    #[error("failed to create speaker font: {0}")]
    FontBuild(String),

    #[error("settings serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
