/// Types partagés du workspace evenhist.
///
/// Grille de pixels, sélection rectangulaire, jeton d'annulation,
/// configuration TOML et erreurs communes.

pub mod cancel;
pub mod config;
pub mod error;
pub mod frame;

pub use cancel::CancelToken;
pub use config::EqualizeConfig;
pub use error::CoreError;
pub use frame::{Channel, FrameBuffer, Region};
