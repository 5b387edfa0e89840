/// Flux pseudo-aléatoire unique d'une égalisation.
///
/// Chaque décision aléatoire du moteur consomme ce flux dans un ordre strict :
/// sens de recherche, côté du décalage, offsets du balayage, puis tirages
/// par pixel. Même graine et même entrée donnent la même sortie.
///
/// # Example
/// ```
/// use eh_engine::rng::RngStream;
/// let mut a = RngStream::new(7);
/// let mut b = RngStream::new(7);
/// assert_eq!(a.below(1000), b.below(1000));
/// assert_eq!(a.draws(), 1);
/// ```
pub struct RngStream {
    rng: fastrand::Rng,
    draws: u64,
}

impl RngStream {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            draws: 0,
        }
    }

    /// Pile ou face.
    #[inline]
    pub fn coin(&mut self) -> bool {
        self.draws += 1;
        self.rng.bool()
    }

    /// Entier uniforme dans `[0, n)`.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    #[inline]
    pub fn below(&mut self, n: u32) -> u32 {
        assert!(n > 0, "tirage dans un intervalle vide");
        self.draws += 1;
        self.rng.u32(0..n)
    }

    /// Nombre de tirages consommés depuis la création.
    #[must_use]
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
