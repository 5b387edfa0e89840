use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Signal d'annulation coopératif, partagé entre le handler Ctrl-C et le moteur.
///
/// Le moteur ne fait que lire le drapeau, aux frontières d'itération et de ligne.
///
/// # Example
/// ```
/// use eh_core::cancel::CancelToken;
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Crée un jeton non annulé.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Demande l'arrêt. Idempotent.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// `true` une fois `cancel()` appelé sur n'importe quel clone.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let clones: Vec<CancelToken> = (0..3).map(|_| token.clone()).collect();
        assert!(clones.iter().all(|c| !c.is_cancelled()));

        clones[1].cancel();
        assert!(token.is_cancelled());
        assert!(clones.iter().all(CancelToken::is_cancelled));
    }

    #[test]
    fn cancel_from_other_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap();
        assert!(token.is_cancelled());
    }
}
