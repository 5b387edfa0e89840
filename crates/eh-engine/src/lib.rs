/// Moteur d'égalisation d'histogramme par transport de masse.
///
/// Chaîne : construction → diffusion → transposition → débruitage optionnel
/// → tirage pondéré sans remise → mélange avec la source.

pub mod bucket;
pub mod denoise;
pub mod diffuse;
pub mod histogram;
pub mod pipeline;
pub mod rng;
pub mod sampler;

pub use bucket::Bucket;
pub use diffuse::{DiffuseOutcome, DiffuseReport, Diffuser};
pub use histogram::{Histogram, TransposedHistogram};
pub use pipeline::{ChannelPass, EqualizeReport, Equalized, equalize};
pub use rng::RngStream;
