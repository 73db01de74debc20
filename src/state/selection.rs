use thiserror::Error;

/// The selection changed after a load was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("selection changed while loading (expected generation {expected}, now {actual})")]
pub struct StaleSelection {
    pub expected: u64,
    pub actual: u64,
}

/// Session selection guarded by a generation counter.
///
/// Each change bumps the generation. A load started under an older generation
/// cannot overwrite a newer selection.
#[derive(Debug, Clone)]
pub struct Selection<T> {
    generation: u64,
    current: Option<T>,
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
        }
    }
}

impl<T> Selection<T> {
    /// Start a selection change and return its generation.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Install the loaded value if no other change started since `generation`.
    pub fn apply(&mut self, generation: u64, value: T) -> Result<(), StaleSelection> {
        if generation != self.generation {
            return Err(StaleSelection {
                expected: generation,
                actual: self.generation,
            });
        }
        self.current = Some(value);
        Ok(())
    }

    /// Drop the selection; in-flight loads become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.as_mut()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_load_is_rejected() {
        let mut selection = Selection::default();
        let first = selection.begin();
        let second = selection.begin();

        assert!(selection.apply(second, "g2").is_ok());
        let err = selection.apply(first, "g1").unwrap_err();
        assert_eq!(err, StaleSelection {
            expected: first,
            actual: second
        });
        assert_eq!(selection.current(), Some(&"g2"));
    }

    #[test]
    fn clear_invalidates_pending_load() {
        let mut selection = Selection::default();
        let generation = selection.begin();
        selection.clear();
        assert!(selection.apply(generation, 1).is_err());
        assert!(selection.current().is_none());
    }
}
