use eh_core::config::LEVELS;

use crate::rng::RngStream;

/// Nombre maximal de sondes d'une recherche aller-retour : couvre les
/// décalages -255..=255 depuis n'importe quelle origine.
const MAX_PROBES: u32 = 2 * LEVELS as u32;

/// Barre d'histogramme : 256 compteurs et leur somme en cache.
///
/// Dans un [`Histogram`](crate::histogram::Histogram) la barre d'un niveau
/// cible compte les pixels par valeur d'origine. Dans un
/// [`TransposedHistogram`](crate::histogram::TransposedHistogram) la barre
/// d'une valeur d'origine compte les pixels par niveau cible.
///
/// Invariant : `amount() == values().iter().sum()`.
///
/// # Example
/// ```
/// use eh_engine::bucket::Bucket;
/// let mut bucket = Bucket::new();
/// bucket.increment(10, 3);
/// bucket.increment(12, 1);
/// assert_eq!(bucket.amount(), 4);
/// assert_eq!(bucket.value(10), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    values: [u32; LEVELS],
    amount: u32,
}

impl Default for Bucket {
    fn default() -> Self {
        Self {
            values: [0; LEVELS],
            amount: 0,
        }
    }
}

impl Bucket {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute `count` unités au compteur `slot`.
    #[inline]
    pub fn increment(&mut self, slot: u8, count: u32) {
        self.values[usize::from(slot)] += count;
        self.amount += count;
    }

    /// Masse totale de la barre.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Compteur d'un slot.
    #[inline]
    #[must_use]
    pub fn value(&self, slot: u8) -> u32 {
        self.values[usize::from(slot)]
    }

    #[must_use]
    pub fn values(&self) -> &[u32; LEVELS] {
        &self.values
    }

    /// Déplace `amount` unités de masse vers `other`, slot pour slot.
    ///
    /// La recherche part de `origin` et rebondit de part et d'autre
    /// (0, ±1, ∓1, ±2, …), le sens du premier pas étant tiré une fois par
    /// appel. Chaque slot visité cède `min(compteur, reste)` au même slot
    /// de `other` : la masse change de barre, jamais de valeur d'origine.
    ///
    /// Retourne la masse effectivement déplacée, égale à `amount` tant que
    /// `amount <= self.amount()`.
    ///
    /// # Example
    /// ```
    /// use eh_engine::bucket::Bucket;
    /// use eh_engine::rng::RngStream;
    ///
    /// let mut from = Bucket::new();
    /// let mut to = Bucket::new();
    /// from.increment(40, 5);
    /// let moved = from.move_count_to(&mut to, 40, 3, &mut RngStream::new(0));
    /// assert_eq!(moved, 3);
    /// assert_eq!((from.amount(), to.amount()), (2, 3));
    /// assert_eq!(to.value(40), 3);
    /// ```
    pub fn move_count_to(
        &mut self,
        other: &mut Bucket,
        origin: u8,
        amount: u32,
        rng: &mut RngStream,
    ) -> u32 {
        debug_assert!(amount <= self.amount, "déplacement supérieur à la masse");
        let upward_first = rng.coin();

        let mut remaining = amount;
        let mut index = i32::from(origin);
        let mut delta = 0i32;
        let mut probes = 0u32;

        while remaining > 0 && probes < MAX_PROBES {
            if let Ok(slot) = usize::try_from(index)
                && slot < LEVELS
            {
                let taken = self.values[slot].min(remaining);
                self.values[slot] -= taken;
                other.values[slot] += taken;
                remaining -= taken;
            }

            delta += 1;
            probes += 1;
            if (delta % 2 == 1) == upward_first {
                index += delta;
            } else {
                index -= delta;
            }
        }

        let moved = amount - remaining;
        self.amount -= moved;
        other.amount += moved;
        moved
    }

    /// Tirage pondéré sans remise : retire une unité d'un slot choisi
    /// proportionnellement aux compteurs restants et retourne ce slot.
    ///
    /// # Panics
    /// Panics if the bucket is empty. Un appel sur une barre vide signifie
    /// que la conservation de masse a été rompue en amont.
    ///
    /// # Example
    /// ```
    /// use eh_engine::bucket::Bucket;
    /// use eh_engine::rng::RngStream;
    ///
    /// let mut bucket = Bucket::new();
    /// bucket.increment(9, 1);
    /// assert_eq!(bucket.claim_value(&mut RngStream::new(3)), 9);
    /// assert_eq!(bucket.amount(), 0);
    /// ```
    pub fn claim_value(&mut self, rng: &mut RngStream) -> u8 {
        assert!(self.amount > 0, "claim_value sur une barre vide");
        let mut choice = rng.below(self.amount);
        self.amount -= 1;

        for (slot, count) in self.values.iter_mut().enumerate() {
            if choice < *count {
                *count -= 1;
                return slot as u8;
            }
            choice -= *count;
        }
        unreachable!("cache de masse désynchronisé des compteurs")
    }

    /// Remodèle la distribution en deux rampes linéaires autour de la médiane.
    ///
    /// Trois rangs sont lus en un seul parcours cumulatif : `quartile / 2`,
    /// `1 / 2` et `1 - quartile / 2` de la masse. Les compteurs sont remis à
    /// zéro, puis chaque moitié de la masse est répartie en rampe montant
    /// de son extrémité vers la médiane. La masse totale est conservée à
    /// l'unité près malgré les arrondis.
    ///
    /// `quartile = 0` étale entre les valeurs extrêmes, `quartile = 1`
    /// concentre tout sur la médiane.
    ///
    /// # Example
    /// ```
    /// use eh_engine::bucket::Bucket;
    /// let mut bucket = Bucket::new();
    /// bucket.increment(100, 10);
    /// bucket.increment(120, 10);
    /// bucket.average(0.0);
    /// assert_eq!(bucket.amount(), 20);
    /// assert_eq!(bucket.values().iter().sum::<u32>(), 20);
    /// assert_eq!(bucket.value(100), 0);
    /// ```
    pub fn average(&mut self, quartile: f64) {
        let total = u64::from(self.amount);
        if total == 0 {
            return;
        }
        let quartile = if quartile.is_nan() {
            0.0
        } else {
            quartile.clamp(0.0, 1.0)
        };

        let rank = |fraction: f64| ((fraction * total as f64).floor() as u64).min(total - 1);
        let ranks = [rank(quartile / 2.0), total / 2, rank(1.0 - quartile / 2.0)];

        let mut positions = [0usize; 3];
        let mut found = 0;
        let mut cumulative = 0u64;
        for (slot, &count) in self.values.iter().enumerate() {
            cumulative += u64::from(count);
            while found < positions.len() && cumulative > ranks[found] {
                positions[found] = slot;
                found += 1;
            }
            if found == positions.len() {
                break;
            }
        }
        let [low, median, high] = positions;

        self.values = [0; LEVELS];
        let lower_share = total / 2;
        spread_ramp(&mut self.values, low, median, lower_share);
        spread_ramp(&mut self.values, high, median, total - lower_share);
    }
}

/// Rampe de `start` (exclu de la masse) vers `end` : le slot à `i` pas de
/// `start` reçoit `round(i * 2 * share / steps²)`. Le reste d'arrondi va
/// sur `end`, un excédent est retiré en repartant de `end`.
fn spread_ramp(values: &mut [u32; LEVELS], start: usize, end: usize, share: u64) {
    let steps = start.abs_diff(end);
    let slot = |i: usize| if start <= end { start + i } else { start - i };

    let mut placed = 0u64;
    if steps > 0 {
        let slope = 2.0 * share as f64 / (steps * steps) as f64;
        for i in 0..steps {
            let v = (i as f64 * slope).round() as u64;
            values[slot(i)] += v as u32;
            placed += v;
        }
    }

    if placed <= share {
        values[end] += (share - placed) as u32;
        return;
    }

    let mut excess = placed - share;
    for i in (0..steps).rev() {
        let s = slot(i);
        let taken = u64::from(values[s]).min(excess);
        values[s] -= taken as u32;
        excess -= taken;
        if excess == 0 {
            break;
        }
    }
}
