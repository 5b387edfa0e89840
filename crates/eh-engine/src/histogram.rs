use eh_core::config::LEVELS;
use eh_core::frame::{Channel, FrameBuffer, Region};

use crate::bucket::Bucket;
use crate::rng::RngStream;

/// Histogramme indexé par niveau cible.
///
/// La barre `t` décrit, par valeur d'origine, les pixels actuellement
/// assignés au niveau `t`. Après construction la matrice est diagonale.
/// La diffusion déplace la masse entre barres voisines sans jamais en
/// créer ni en détruire.
///
/// # Example
/// ```
/// use eh_engine::histogram::Histogram;
/// let hist = Histogram::from_values([10, 10, 200, 200]);
/// assert_eq!(hist.amount(10), 2);
/// assert_eq!(hist.bucket(200).value(200), 2);
/// assert_eq!(hist.total(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    buckets: Vec<Bucket>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            buckets: vec![Bucket::new(); LEVELS],
        }
    }
}

impl Histogram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compte un flux de valeurs de canal. Indépendant de l'ordre.
    pub fn from_values<I: IntoIterator<Item = u8>>(values: I) -> Self {
        let mut counts = [0u32; LEVELS];
        for v in values {
            counts[usize::from(v)] += 1;
        }
        let mut hist = Self::new();
        for (level, &count) in counts.iter().enumerate() {
            if count > 0 {
                hist.buckets[level].increment(level as u8, count);
            }
        }
        hist
    }

    /// Construit l'histogramme d'un canal sur une sélection.
    ///
    /// La sélection doit avoir été validée contre `frame`.
    ///
    /// # Example
    /// ```
    /// use eh_core::frame::{Channel, FrameBuffer, Region};
    /// use eh_engine::histogram::Histogram;
    ///
    /// let frame = FrameBuffer::from_gray(2, 2, &[10, 10, 200, 200]).unwrap();
    /// let hist = Histogram::from_channel(&frame, Region::full(&frame), Channel::Red);
    /// assert_eq!(hist.total(), 4);
    /// ```
    #[must_use]
    pub fn from_channel(frame: &FrameBuffer, region: Region, channel: Channel) -> Self {
        Self::from_values(
            region
                .rows()
                .flat_map(|y| region.columns().map(move |x| (x, y)))
                .map(|(x, y)| frame.channel(x, y, channel)),
        )
    }

    #[inline]
    #[must_use]
    pub fn bucket(&self, level: u8) -> &Bucket {
        &self.buckets[usize::from(level)]
    }

    /// Masse assignée au niveau `level`.
    #[inline]
    #[must_use]
    pub fn amount(&self, level: u8) -> u32 {
        self.buckets[usize::from(level)].amount()
    }

    /// Masse totale, égale au nombre de pixels comptés.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| u64::from(b.amount())).sum()
    }

    /// `(min, max)` des masses par niveau.
    #[must_use]
    pub fn spread(&self) -> (u32, u32) {
        self.buckets
            .iter()
            .map(Bucket::amount)
            .fold((u32::MAX, 0), |(lo, hi), a| (lo.min(a), hi.max(a)))
    }

    /// Équilibre localement le niveau `level` contre ses voisins.
    ///
    /// Le côté est tiré proportionnellement à l'écart de chaque voisin
    /// moins peuplé, puis la moitié (arrondie au-dessus) de cet écart est
    /// déplacée, la recherche de masse partant de `level`. Retourne la masse
    /// déplacée, 0 si aucun voisin n'est moins peuplé (aucun tirage alors).
    pub fn shift(&mut self, level: u8, rng: &mut RngStream) -> u32 {
        let index = usize::from(level);
        let amount = self.buckets[index].amount();
        let lower_delta = if index == 0 {
            0
        } else {
            amount.saturating_sub(self.buckets[index - 1].amount())
        };
        let upper_delta = if index == LEVELS - 1 {
            0
        } else {
            amount.saturating_sub(self.buckets[index + 1].amount())
        };

        let total = lower_delta + upper_delta;
        if total == 0 {
            return 0;
        }

        let (destination, delta) = if rng.below(total) < lower_delta {
            (index - 1, lower_delta)
        } else {
            (index + 1, upper_delta)
        };

        let (source, target) = self.pair_mut(index, destination);
        source.move_count_to(target, level, delta.div_ceil(2), rng)
    }

    /// Deux barres distinctes en mutable.
    fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Bucket, &mut Bucket) {
        debug_assert_ne!(a, b);
        if a < b {
            let (left, right) = self.buckets.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.buckets.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    /// Réindexe par valeur d'origine. Consomme l'histogramme.
    ///
    /// # Example
    /// ```
    /// use eh_engine::histogram::Histogram;
    /// let hist = Histogram::from_values([3, 3, 7]);
    /// let transposed = hist.transpose();
    /// assert_eq!(transposed.bucket(3).value(3), 2);
    /// assert_eq!(transposed.bucket(7).amount(), 1);
    /// ```
    #[must_use]
    pub fn transpose(self) -> TransposedHistogram {
        let mut buckets = vec![Bucket::new(); LEVELS];
        for (target, bar) in self.buckets.iter().enumerate() {
            for (origin, &count) in bar.values().iter().enumerate() {
                if count > 0 {
                    buckets[origin].increment(target as u8, count);
                }
            }
        }
        TransposedHistogram { buckets }
    }
}

/// Histogramme indexé par valeur d'origine : la barre `v` donne, par
/// niveau cible, où est partie la masse née en `v`.
///
/// C'est la structure consommée par le tirage : chaque pixel d'origine `v`
/// retire une unité de la barre `v`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransposedHistogram {
    buckets: Vec<Bucket>,
}

impl TransposedHistogram {
    #[inline]
    #[must_use]
    pub fn bucket(&self, origin: u8) -> &Bucket {
        &self.buckets[usize::from(origin)]
    }

    /// Tire le niveau de sortie d'un pixel d'origine `origin`.
    ///
    /// # Panics
    /// Panics if every unit born at `origin` has already been claimed.
    #[inline]
    pub fn claim(&mut self, origin: u8, rng: &mut RngStream) -> u8 {
        self.buckets[usize::from(origin)].claim_value(rng)
    }

    pub fn buckets_mut(&mut self) -> impl Iterator<Item = &mut Bucket> {
        self.buckets.iter_mut()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| u64::from(b.amount())).sum()
    }
}
