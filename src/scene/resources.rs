use std::collections::HashSet;

use log::debug;

use crate::geometry::GeometryId;

/// Bookkeeping for geometry resources attached to the scene.
///
/// Every geometry that enters the graph is registered; every one that leaves
/// it is released exactly once. The renderer drops GPU buffers of ids that are
/// no longer live.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    live: HashSet<GeometryId>,
    released_total: u64,
}

impl ResourceLedger {
    pub fn register(&mut self, id: GeometryId) {
        self.live.insert(id);
    }

    /// Release `id`. Releasing an id that is not live is ignored and returns
    /// `false`.
    pub fn release(&mut self, id: GeometryId) -> bool {
        if self.live.remove(&id) {
            self.released_total += 1;
            true
        } else {
            debug!("geometry {} already released", id.raw());
            false
        }
    }

    pub fn is_live(&self, id: GeometryId) -> bool {
        self.live.contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn released_total(&self) -> u64 {
        self.released_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::uv_sphere;

    #[test]
    fn test_release_is_idempotent() {
        let g = uv_sphere(1.0, 4, 4).unwrap();
        let mut ledger = ResourceLedger::default();
        ledger.register(g.id());
        assert!(ledger.is_live(g.id()));

        assert!(ledger.release(g.id()));
        assert!(!ledger.release(g.id()));
        assert!(!ledger.is_live(g.id()));
        assert_eq!(ledger.released_total(), 1);
        assert_eq!(ledger.live_count(), 0);
    }
}
