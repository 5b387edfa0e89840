use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// Unsupported file or data format.
    #[error("Format non supporté : {format}")]
    UnsupportedFormat {
        /// The format string that is unsupported.
        format: String,
    },

    /// Pixel data does not match the declared width/height.
    #[error("Dimensions invalides : {width}×{height} ({len} octets)")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
        /// Length of the supplied buffer.
        len: usize,
    },

    /// Selection rectangle leaves the frame.
    #[error("Sélection {x},{y} {width}×{height} hors de l'image {frame_width}×{frame_height}")]
    RegionOutOfBounds {
        /// Left edge.
        x: u32,
        /// Top edge.
        y: u32,
        /// Selection width.
        width: u32,
        /// Selection height.
        height: u32,
        /// Frame width.
        frame_width: u32,
        /// Frame height.
        frame_height: u32,
    },
}
