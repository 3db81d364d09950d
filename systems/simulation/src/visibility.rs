use std::collections::BTreeMap;

use iso_dimension_core::EntityId;

/// Remembers the last visibility flag of every entity so only flips are
/// reported.
#[derive(Clone, Debug, Default)]
pub(crate) struct VisibilityTracker {
    flags: BTreeMap<EntityId, bool>,
}

impl VisibilityTracker {
    /// Records the entity's visibility, returning the flag when it flipped.
    ///
    /// Entities start out hidden, so the first visible observation is a flip
    /// while a first hidden observation is not.
    pub(crate) fn observe(&mut self, entity: EntityId, visible: bool) -> Option<bool> {
        let previous = self.flags.insert(entity, visible).unwrap_or(false);
        (previous != visible).then_some(visible)
    }
}

#[cfg(test)]
mod tests {
    use iso_dimension_core::CellCoord;

    use super::*;

    #[test]
    fn reports_only_flips() {
        let mut tracker = VisibilityTracker::default();
        let tile = EntityId::Tile(CellCoord::new(1, 1));

        assert_eq!(tracker.observe(tile, false), None);
        assert_eq!(tracker.observe(tile, true), Some(true));
        assert_eq!(tracker.observe(tile, true), None);
        assert_eq!(tracker.observe(tile, false), Some(false));
        assert_eq!(tracker.observe(EntityId::Actor, true), Some(true));
    }
}
