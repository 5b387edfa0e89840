use eh_core::cancel::CancelToken;
use eh_core::config::{EqualizeConfig, LEVELS};

use crate::histogram::Histogram;
use crate::rng::RngStream;

/// Raison de l'arrêt d'une diffusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffuseOutcome {
    /// `max - min <= 1`, ou plus aucun pic avec un voisin moins peuplé.
    Balanced,
    /// Budget d'itérations épuisé avant l'équilibre.
    IterationLimit,
    /// Annulation externe. L'histogramme reste partiellement équilibré.
    Cancelled,
    /// Aucun progrès pendant [`STALL_WINDOW`] itérations : les décalages ne
    /// font plus qu'échanger des masses voisines, typiquement un cycle de
    /// pics sans balayage.
    Stalled,
}

/// Itérations consécutives sans baisse de la somme des carrés des masses
/// avant d'abandonner.
pub const STALL_WINDOW: u32 = (LEVELS * LEVELS) as u32;

/// Bilan d'une diffusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffuseReport {
    /// Itérations effectuées.
    pub iterations: u32,
    /// `max - min` avant diffusion.
    pub spread_before: u32,
    /// `max - min` après diffusion.
    pub spread_after: u32,
    pub outcome: DiffuseOutcome,
}

/// Moteur d'équilibrage itératif.
///
/// Chaque itération décale le plus haut pic ayant un voisin strictement
/// moins peuplé, puis, si `sweep_steps > 0`, parcourt `sweep_steps` niveaux
/// dans une permutation aléatoire `((i ^ a) + b) mod 256` en équilibrant
/// chacun localement.
///
/// # Example
/// ```
/// use eh_core::cancel::CancelToken;
/// use eh_engine::diffuse::{DiffuseOutcome, Diffuser};
/// use eh_engine::histogram::Histogram;
/// use eh_engine::rng::RngStream;
///
/// let mut hist = Histogram::from_values([10, 10, 200, 200]);
/// let report = Diffuser::new(0, 256).run(&mut hist, &mut RngStream::new(0), &CancelToken::new());
/// assert_eq!(report.outcome, DiffuseOutcome::Balanced);
/// let (min, max) = hist.spread();
/// assert!(max - min <= 1);
/// assert_eq!(hist.total(), 4);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Diffuser {
    max_iterations: u32,
    sweep_steps: u16,
}

impl Diffuser {
    /// `max_iterations = 0` : pas de limite. `sweep_steps` est borné à 256.
    #[must_use]
    pub fn new(max_iterations: u32, sweep_steps: u16) -> Self {
        Self {
            max_iterations,
            sweep_steps: sweep_steps.min(LEVELS as u16),
        }
    }

    #[must_use]
    pub fn from_config(config: &EqualizeConfig) -> Self {
        Self::new(config.max_iterations, config.sweep_steps)
    }

    /// Diffuse `hist` en place jusqu'à l'équilibre, la limite ou l'annulation.
    pub fn run(
        &self,
        hist: &mut Histogram,
        rng: &mut RngStream,
        cancel: &CancelToken,
    ) -> DiffuseReport {
        let spread_before = spread(hist);
        let mut iterations = 0u32;
        // Un décalage d'écart d ne fait jamais monter cette somme, et la fait
        // baisser dès que d >= 2.
        let mut best_energy = energy(hist);
        let mut stale = 0u32;

        let outcome = loop {
            if cancel.is_cancelled() {
                break DiffuseOutcome::Cancelled;
            }
            let Some(peak) = unbalanced_peak(hist) else {
                break DiffuseOutcome::Balanced;
            };
            if self.max_iterations != 0 && iterations >= self.max_iterations {
                break DiffuseOutcome::IterationLimit;
            }
            if stale >= STALL_WINDOW {
                break DiffuseOutcome::Stalled;
            }

            hist.shift(peak, rng);
            self.sweep(hist, rng);
            iterations += 1;

            let current = energy(hist);
            if current < best_energy {
                best_energy = current;
                stale = 0;
            } else {
                stale += 1;
            }
        };

        let report = DiffuseReport {
            iterations,
            spread_before,
            spread_after: spread(hist),
            outcome,
        };
        log::debug!(
            "Diffusion : {:?} après {} itérations, écart {} → {}",
            report.outcome,
            report.iterations,
            report.spread_before,
            report.spread_after
        );
        if report.outcome == DiffuseOutcome::Stalled {
            log::warn!(
                "Diffusion bloquée après {} itérations (écart {}), augmenter sweep_steps",
                report.iterations,
                report.spread_after
            );
        }
        report
    }

    fn sweep(&self, hist: &mut Histogram, rng: &mut RngStream) {
        if self.sweep_steps == 0 {
            return;
        }
        let a = rng.below(LEVELS as u32) as usize;
        let b = rng.below(LEVELS as u32) as usize;
        for i in 0..usize::from(self.sweep_steps) {
            hist.shift((((i ^ a) + b) % LEVELS) as u8, rng);
        }
    }
}

impl Default for Diffuser {
    fn default() -> Self {
        Self::from_config(&EqualizeConfig::default())
    }
}

fn spread(hist: &Histogram) -> u32 {
    let (min, max) = hist.spread();
    max - min
}

fn energy(hist: &Histogram) -> u64 {
    (0..=u8::MAX)
        .map(|level| u64::from(hist.amount(level)).pow(2))
        .sum()
}

/// Niveau à décaler, ou `None` si l'histogramme est équilibré.
///
/// Parcours croissant : à masse égale le premier niveau trouvé l'emporte.
/// Seul un niveau avec au moins un voisin strictement moins peuplé compte
/// comme pic.
fn unbalanced_peak(hist: &Histogram) -> Option<u8> {
    let mut min = u32::MAX;
    let mut peak: Option<(u8, u32)> = None;

    for level in 0..=u8::MAX {
        let amount = hist.amount(level);
        min = min.min(amount);

        if peak.is_none_or(|(_, max)| amount > max) {
            let lower_below = level > 0 && hist.amount(level - 1) < amount;
            let lower_above = level < u8::MAX && hist.amount(level + 1) < amount;
            if lower_below || lower_above {
                peak = Some((level, amount));
            }
        }
    }

    peak.filter(|&(_, max)| max - min > 1).map(|(level, _)| level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(hist: &mut Histogram, seed: u64) -> DiffuseReport {
        Diffuser::new(0, 256).run(hist, &mut RngStream::new(seed), &CancelToken::new())
    }

    fn assert_flat(hist: &Histogram) {
        let (min, max) = hist.spread();
        assert!(max - min <= 1, "écart {min}..{max}");
    }

    #[test]
    fn two_by_two_example_flattens() {
        let mut hist = Histogram::from_values([10, 10, 200, 200]);
        assert_eq!(hist.amount(10), 2);
        assert_eq!(hist.amount(200), 2);
        assert_eq!(unbalanced_peak(&hist), Some(10));

        let report = run(&mut hist, 0);
        assert_eq!(report.outcome, DiffuseOutcome::Balanced);
        assert_eq!(report.spread_before, 2);
        assert_flat(&hist);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn tie_break_is_lowest_level() {
        let hist = Histogram::from_values([50, 50, 50, 20, 20, 20, 90, 90, 90]);
        assert_eq!(unbalanced_peak(&hist), Some(20));
    }

    #[test]
    fn plateau_interior_is_not_a_peak() {
        // pic en 1, mais écart global de 1 : équilibré
        let mut values: Vec<u8> = (0..=255u8).flat_map(|v| [v, v, v]).collect();
        values.extend([0, 1]);
        let hist = Histogram::from_values(values);
        assert_eq!(unbalanced_peak(&hist), None);

        let mut values: Vec<u8> = (0..=255u8).flat_map(|v| [v, v]).collect();
        values.extend([0, 0, 1, 1]);
        let hist = Histogram::from_values(values);
        assert_eq!(unbalanced_peak(&hist), Some(1));
    }

    #[test]
    fn empty_histogram_is_immediately_balanced() {
        let mut hist = Histogram::new();
        let mut rng = RngStream::new(0);
        let report = Diffuser::new(0, 256).run(&mut hist, &mut rng, &CancelToken::new());
        assert_eq!(report.outcome, DiffuseOutcome::Balanced);
        assert_eq!(report.iterations, 0);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn spike_spreads_flat() {
        let mut hist = Histogram::from_values(std::iter::repeat_n(128u8, 16));
        run(&mut hist, 4);
        assert_flat(&hist);
        assert_eq!(hist.total(), 16);
        assert!((0..=255u8).all(|l| hist.amount(l) <= 1));
    }

    #[test]
    fn random_small_inputs_converge() {
        let mut values_rng = fastrand::Rng::with_seed(99);
        for seed in 0..12 {
            let values: Vec<u8> = (0..64).map(|_| values_rng.u8(..)).collect();
            let mut hist = Histogram::from_values(values);
            let report = run(&mut hist, seed);
            assert_eq!(report.outcome, DiffuseOutcome::Balanced, "seed {seed}");
            assert_flat(&hist);
            assert_eq!(hist.total(), 64);
        }
    }

    #[test]
    fn peaks_alone_can_balance_sparse_input() {
        let mut hist = Histogram::from_values([10, 10, 200, 200]);
        let report =
            Diffuser::new(0, 0).run(&mut hist, &mut RngStream::new(1), &CancelToken::new());
        assert_eq!(report.outcome, DiffuseOutcome::Balanced);
        assert_flat(&hist);
    }

    #[test]
    fn peak_cycle_without_sweep_stops_as_stalled() {
        // niveaux 0..3 = [1, 2, 2, 1] : le pic oscille entre 1 et 0
        let mut hist = Histogram::from_values([0, 1, 1, 2, 2, 3, 255, 255]);
        assert_eq!(unbalanced_peak(&hist), Some(1));
        let before = energy(&hist);

        let report =
            Diffuser::new(0, 0).run(&mut hist, &mut RngStream::new(1), &CancelToken::new());
        assert_eq!(report.outcome, DiffuseOutcome::Stalled);
        assert_eq!(report.iterations, STALL_WINDOW);
        assert_eq!(energy(&hist), before);
        assert_eq!(hist.total(), 8);
    }

    #[test]
    fn shifts_never_raise_energy() {
        let mut hist = Histogram::from_values((0..500u32).map(|i| (i * 7 % 61) as u8));
        let mut rng = RngStream::new(3);
        let mut last = energy(&hist);
        for level in (0..=u8::MAX).cycle().take(2000) {
            hist.shift(level, &mut rng);
            let now = energy(&hist);
            assert!(now <= last);
            last = now;
        }
        assert_eq!(hist.total(), 500);
    }

    #[test]
    fn iteration_cap_is_honoured() {
        let mut hist = Histogram::from_values(std::iter::repeat_n(0u8, 4096));
        let report =
            Diffuser::new(3, 256).run(&mut hist, &mut RngStream::new(0), &CancelToken::new());
        assert_eq!(report.outcome, DiffuseOutcome::IterationLimit);
        assert_eq!(report.iterations, 3);
        assert!(report.spread_after < report.spread_before);
        assert_eq!(hist.total(), 4096);
    }

    #[test]
    fn cancelled_before_start_leaves_histogram_untouched() {
        let mut hist = Histogram::from_values([1, 1, 1, 1]);
        let original = hist.clone();
        let cancel = CancelToken::new();
        cancel.cancel();
        let report = Diffuser::default().run(&mut hist, &mut RngStream::new(0), &cancel);
        assert_eq!(report.outcome, DiffuseOutcome::Cancelled);
        assert_eq!(report.iterations, 0);
        assert_eq!(hist, original);
    }

    #[test]
    fn same_seed_same_result() {
        let values: Vec<u8> = (0..700u32).map(|i| (i * i % 97) as u8).collect();
        let mut a = Histogram::from_values(values.iter().copied());
        let mut b = Histogram::from_values(values.iter().copied());
        let diffuser = Diffuser::new(200, 64);
        let ra = diffuser.run(&mut a, &mut RngStream::new(5), &CancelToken::new());
        let rb = diffuser.run(&mut b, &mut RngStream::new(5), &CancelToken::new());
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }
}
