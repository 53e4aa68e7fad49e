//! Generational identifiers

use slotmap::new_key_type;

pub use slotmap::Key;

new_key_type! {
    /// Process-unique identifier of a spawned object
    ///
    /// Identifiers are weak references: once the object is destroyed its
    /// slot may be reused, but old identifiers resolve to nothing instead of
    /// the new occupant. `UniqueId::default()` is the null id.
    pub struct UniqueId;

    /// Key into the state manager's spline registry; null means "no path"
    pub struct SplinePathId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_default_is_null() {
        assert!(UniqueId::default().is_null());
        assert!(SplinePathId::null().is_null());
    }

    #[test]
    fn test_stale_id_does_not_resolve() {
        let mut map: SlotMap<UniqueId, &str> = SlotMap::with_key();
        let old = map.insert("first");
        map.remove(old);
        let new = map.insert("second");
        assert_ne!(old, new);
        assert!(map.get(old).is_none());
    }
}
