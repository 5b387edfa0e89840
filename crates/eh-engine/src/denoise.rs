use crate::histogram::TransposedHistogram;

/// Étale la distribution de sortie de chaque valeur d'origine en triangle
/// autour de sa médiane, ce qui casse le banding au prix d'une planéité
/// moins parfaite.
///
/// `strength` ∈ [0, 1] : 0 ne touche à rien, 0.5 étale sur l'intervalle
/// interquartile, 1 entre les niveaux extrêmes atteints.
///
/// # Example
/// ```
/// use eh_engine::denoise::denoise;
/// use eh_engine::histogram::Histogram;
///
/// let mut transposed = Histogram::from_values([4, 4, 4]).transpose();
/// denoise(&mut transposed, 1.0);
/// assert_eq!(transposed.bucket(4).amount(), 3);
/// ```
pub fn denoise(transposed: &mut TransposedHistogram, strength: f32) {
    if strength.is_nan() || strength <= 0.0 {
        return;
    }
    let quartile = 1.0 - f64::from(strength.min(1.0));
    for bucket in transposed.buckets_mut() {
        bucket.average(quartile);
    }
}
