/// Monotonic generation counter for one request slot.
///
/// Each new request advances the epoch and carries the new value; a reply is
/// applied only if its epoch is still current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Epoch(u64);

impl Epoch {
    /// Start a new generation and return it.
    pub fn advance(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    /// The current generation.
    pub const fn current(self) -> u64 {
        self.0
    }

    /// Whether `generation` is the latest one issued.
    pub const fn is_current(self, generation: u64) -> bool {
        self.0 == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_is_current() {
        let mut epoch = Epoch::default();
        let first = epoch.advance();
        let second = epoch.advance();

        assert!(!epoch.is_current(first));
        assert!(epoch.is_current(second));
        assert_eq!(epoch.current(), second);
    }

    #[test]
    fn test_advance_invalidates_without_new_request() {
        let mut epoch = Epoch::default();
        let issued = epoch.advance();
        epoch.advance();
        assert!(!epoch.is_current(issued));
    }
}
