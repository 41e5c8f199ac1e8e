/*!
 * Signal Sets
 * Bitset over the emulated signal space (membership only, no counts)
 */

use super::types::Signal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Set of emulated signals
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigSet(u32);

impl SigSet {
    #[inline]
    pub const fn empty() -> Self {
        SigSet(0)
    }

    /// Set containing exactly the given signals
    pub const fn of(signals: &[Signal]) -> Self {
        let mut bits = 0u32;
        let mut i = 0;
        while i < signals.len() {
            bits |= 1 << signals[i] as u32;
            i += 1;
        }
        SigSet(bits)
    }

    #[inline]
    pub fn insert(&mut self, signal: Signal) {
        self.0 |= Self::bit(signal);
    }

    #[inline]
    pub fn remove(&mut self, signal: Signal) {
        self.0 &= !Self::bit(signal);
    }

    #[inline]
    pub fn contains(&self, signal: Signal) -> bool {
        self.0 & Self::bit(signal) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members of `self` that are not in `other`
    #[inline]
    pub fn difference(&self, other: SigSet) -> SigSet {
        SigSet(self.0 & !other.0)
    }

    /// Members in numeric order
    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        Signal::ALL.into_iter().filter(|s| self.contains(*s))
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }

    #[inline]
    fn bit(signal: Signal) -> u32 {
        1 << signal.number()
    }
}

impl FromIterator<Signal> for SigSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        let mut set = SigSet::empty();
        for signal in iter {
            set.insert(signal);
        }
        set
    }
}

impl fmt::Debug for SigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for SigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|s| format!("{:?}", s)).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
