use serde::{Deserialize, Serialize};

/// Sequence number of an issued request.
///
/// Generations are totally ordered; a larger generation was issued later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(pub u64);

/// Issues monotonically increasing generations and remembers the latest one.
///
/// Only the result of the latest issued generation is current; anything
/// older is stale, even if it completes later.
#[derive(Debug, Default, Clone)]
pub struct GenerationCounter {
    latest: Option<Generation>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next generation. The first issued generation is 1.
    pub fn issue(&mut self) -> Generation {
        let next = Generation(self.latest.map_or(1, |g| g.0 + 1));
        self.latest = Some(next);
        next
    }

    pub fn latest(&self) -> Option<Generation> {
        self.latest
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest == Some(generation)
    }
}
