use std::fmt;
use crate::common::types::FrameId;

/// Page replacement policy used when the pool has no free frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Evict the unpinned frame touched least recently
    #[default]
    Lru,
    /// Evict the unpinned frame touched most recently
    Mru,
}

impl ReplacementPolicy {
    /// Parse a policy name. "MRU" (any case) selects MRU, anything else falls back to LRU.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("MRU") {
            ReplacementPolicy::Mru
        } else {
            ReplacementPolicy::Lru
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReplacementPolicy::Lru => "LRU",
            ReplacementPolicy::Mru => "MRU",
        }
    }

    /// Pick a victim among `(frame_id, last_touch)` candidates.
    /// Equal touch values go to the lowest frame index.
    pub fn select_victim<I>(&self, candidates: I) -> Option<FrameId>
    where
        I: IntoIterator<Item = (FrameId, u64)>,
    {
        let mut best: Option<(FrameId, u64)> = None;

        for (frame_id, touch) in candidates {
            let replace = match best {
                None => true,
                Some((best_id, best_touch)) => {
                    let ahead = match self {
                        ReplacementPolicy::Lru => touch < best_touch,
                        ReplacementPolicy::Mru => touch > best_touch,
                    };
                    ahead || (touch == best_touch && frame_id < best_id)
                }
            };
            if replace {
                best = Some((frame_id, touch));
            }
        }

        best.map(|(frame_id, _)| frame_id)
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
