use eh_core::cancel::CancelToken;
use eh_core::frame::{Channel, FrameBuffer, Region};

use crate::histogram::TransposedHistogram;
use crate::rng::RngStream;

/// Résultat d'un remappage de canal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Remapped {
    /// Pixels réécrits.
    pub pixels: u64,
    /// Arrêt sur annulation : les lignes restantes gardent leur valeur.
    pub cancelled: bool,
}

/// Remappe `source` sur la sélection, ligne par ligne.
///
/// Chaque pixel lit sa valeur d'origine dans `source`, tire son niveau de
/// sortie dans la barre correspondante de `transposed` et l'écrit dans
/// chacun des canaux `targets`. L'annulation est testée avant chaque ligne.
pub fn remap(
    frame: &mut FrameBuffer,
    region: Region,
    source: Channel,
    targets: &[Channel],
    transposed: &mut TransposedHistogram,
    rng: &mut RngStream,
    cancel: &CancelToken,
) -> Remapped {
    let mut pixels = 0u64;
    for y in region.rows() {
        if cancel.is_cancelled() {
            return Remapped {
                pixels,
                cancelled: true,
            };
        }
        for x in region.columns() {
            let origin = frame.channel(x, y, source);
            let level = transposed.claim(origin, rng);
            for &target in targets {
                frame.set_channel(x, y, target, level);
            }
            pixels += 1;
        }
    }
    Remapped {
        pixels,
        cancelled: false,
    }
}

/// Interpolation source → résultat, extrapolée hors de [0, 1].
///
/// Arrondi au pair le plus proche, puis borné à [0, 255].
///
/// # Example
/// ```
/// use eh_engine::sampler::lerp;
/// assert_eq!(lerp(100, 150, 2.0), 200);
/// assert_eq!(lerp(100, 150, 0.0), 100);
/// assert_eq!(lerp(200, 100, 3.0), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn lerp(source: u8, result: u8, mix: f64) -> u8 {
    let a = f64::from(source);
    let b = f64::from(result);
    (a + (b - a) * mix).clamp(0.0, 255.0).round_ties_even() as u8
}

/// Mélange R, G et B de `result` avec `source` sur la sélection.
/// L'alpha et l'extérieur de la sélection restent ceux de `result`.
pub fn blend(source: &FrameBuffer, result: &mut FrameBuffer, region: Region, mix: f64) {
    if region.is_empty() || (mix - 1.0).abs() < f64::EPSILON {
        return;
    }
    for y in region.rows() {
        for x in region.columns() {
            for channel in Channel::RGB {
                let mixed = lerp(
                    source.channel(x, y, channel),
                    result.channel(x, y, channel),
                    mix,
                );
                result.set_channel(x, y, channel, mixed);
            }
        }
    }
}
