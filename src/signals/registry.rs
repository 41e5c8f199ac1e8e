/*!
 * Signal Disposition Registry
 * Fixed-size disposition table over the emulated signal space
 */

use super::core::types::{Disposition, Signal};
use crate::core::limits::SIGNAL_COUNT;
use tracing::debug;

/// Disposition table, one entry per signal, all `Default` initially
#[derive(Debug, Clone)]
pub struct Registry {
    table: [Disposition; SIGNAL_COUNT],
}

impl Registry {
    pub fn new() -> Self {
        Self {
            table: std::array::from_fn(|_| Disposition::Default),
        }
    }

    /// Install a disposition, returning the one it replaces
    pub fn set(&mut self, signal: Signal, disposition: Disposition) -> Disposition {
        debug!(signal = %signal, new = ?disposition, "Setting disposition");
        std::mem::replace(&mut self.table[signal.index()], disposition)
    }

    pub fn get(&self, signal: Signal) -> &Disposition {
        &self.table[signal.index()]
    }

    /// Restore every entry to `Default`
    pub fn reset(&mut self) {
        self.table.iter_mut().for_each(|d| *d = Disposition::Default);
    }

    /// Signals with a non-default disposition
    pub fn customized(&self) -> impl Iterator<Item = (Signal, &Disposition)> + '_ {
        Signal::ALL
            .into_iter()
            .map(|s| (s, &self.table[s.index()]))
            .filter(|(_, d)| !d.is_default())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_default() {
        let registry = Registry::new();
        for signal in Signal::ALL {
            assert!(registry.get(signal).is_default());
        }
        assert_eq!(registry.customized().count(), 0);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut registry = Registry::new();
        let handler = Disposition::handler(|_, _| {});

        let prev = registry.set(Signal::SIGINT, Disposition::Ignore);
        assert!(prev.is_default());

        let prev = registry.set(Signal::SIGINT, handler.clone());
        assert!(prev.is_ignore());
        assert_eq!(registry.get(Signal::SIGINT), &handler);

        // Other entries untouched
        assert!(registry.get(Signal::SIGTERM).is_default());
    }

    #[test]
    fn test_reset() {
        let mut registry = Registry::new();
        registry.set(Signal::SIGALRM, Disposition::Ignore);
        registry.set(Signal::SIGCHLD, Disposition::Ignore);
        assert_eq!(registry.customized().count(), 2);

        registry.reset();
        assert_eq!(registry.customized().count(), 0);
    }
}
