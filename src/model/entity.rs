//! State shared by every optimized entity (page, resource, sub-resource).

use std::collections::BTreeMap;
use std::path::Path;

/// Size measurement points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeType {
    /// Size when first seen (a downloaded `.min.` file may already be minified).
    Original,
    Modified,
    Gzipped,
}

impl SizeType {
    pub const ALL: [SizeType; 3] = [SizeType::Original, SizeType::Modified, SizeType::Gzipped];
}

/// Ignore state, change log and size statistics.
#[derive(Debug, Default, Clone)]
pub struct Entity {
    ignore_reason: Option<String>,
    changes: Vec<String>,
    stats: BTreeMap<SizeType, u64>,
}

impl Entity {
    /// Exclude from all further processing. The first reason wins.
    pub fn ignore(&mut self, reason: impl Into<String>) {
        if self.ignore_reason.is_none() {
            self.ignore_reason = Some(reason.into());
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore_reason.is_some()
    }

    pub fn ignore_reason(&self) -> Option<&str> {
        self.ignore_reason.as_deref()
    }

    pub fn record_change(&mut self, change: impl Into<String>) {
        self.changes.push(change.into());
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn changes(&self) -> &[String] {
        &self.changes
    }

    /// Record a size once per measurement point.
    ///
    /// # Panics
    ///
    /// If `size_type` was already recorded for this entity.
    pub fn record_size(&mut self, size_type: SizeType, size: u64) {
        let previous = self.stats.insert(size_type, size);
        assert!(previous.is_none(), "{size_type:?} size recorded twice");
    }

    pub fn size(&self, size_type: SizeType) -> Option<u64> {
        self.stats.get(&size_type).copied()
    }

    /// Size at `size_type`, falling back to the closest earlier measurement.
    pub fn effective_size(&self, size_type: SizeType) -> Option<u64> {
        SizeType::ALL
            .iter()
            .rev()
            .filter(|t| **t <= size_type)
            .find_map(|t| self.size(*t))
    }
}

/// Access to the shared state of an optimized item.
pub trait Optimized {
    fn entity(&self) -> &Entity;

    /// Short name used in reports.
    fn display_name(&self) -> String;

    fn is_ignored(&self) -> bool {
        self.entity().is_ignored()
    }

    fn has_changes(&self) -> bool {
        self.entity().has_changes()
    }

    /// Generated siblings (source map, `.gz`).
    fn side_files(&self) -> Vec<&Path> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_keeps_first_reason() {
        let mut entity = Entity::default();
        assert!(!entity.is_ignored());
        entity.ignore("not found");
        entity.ignore("download fail");
        assert!(entity.is_ignored());
        assert_eq!(entity.ignore_reason(), Some("not found"));
    }

    #[test]
    fn test_changes_are_ordered() {
        let mut entity = Entity::default();
        assert!(!entity.has_changes());
        entity.record_change("a -> b");
        entity.record_change("minified");
        assert_eq!(entity.changes(), ["a -> b", "minified"]);
    }

    #[test]
    #[should_panic(expected = "recorded twice")]
    fn test_size_recorded_once() {
        let mut entity = Entity::default();
        entity.record_size(SizeType::Original, 10);
        entity.record_size(SizeType::Original, 20);
    }

    #[test]
    fn test_effective_size_falls_back() {
        let mut entity = Entity::default();
        entity.record_size(SizeType::Original, 100);
        assert_eq!(entity.effective_size(SizeType::Modified), Some(100));
        entity.record_size(SizeType::Modified, 60);
        assert_eq!(entity.effective_size(SizeType::Modified), Some(60));
        assert_eq!(entity.effective_size(SizeType::Original), Some(100));
        assert_eq!(entity.size(SizeType::Gzipped), None);
    }
}
