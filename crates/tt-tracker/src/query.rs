use tt_core::{GameInstance, InstanceStatus};

use crate::snapshot::Snapshot;

/// A builder for filtering and searching game instances in a snapshot.
pub struct InstanceQuery<'s> {
    snapshot: &'s Snapshot,
    status_filter: Option<InstanceStatus>,
    tag_filters: Vec<String>,
    name_contains: Option<String>,
    limit: Option<usize>,
    offset: usize,
}

impl<'s> InstanceQuery<'s> {
    /// Start an unfiltered query.
    pub fn new(snapshot: &'s Snapshot) -> Self {
        Self {
            snapshot,
            status_filter: None,
            tag_filters: Vec::new(),
            name_contains: None,
            limit: None,
            offset: 0,
        }
    }

    /// Filter by status.
    pub fn status(mut self, status: InstanceStatus) -> Self {
        self.status_filter = Some(status);
        self
    }

    /// Filter to instances that have a specific tag (case-insensitive).
    /// Repeated calls require every tag.
    pub fn tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tag_filters.push(tag.as_ref().to_string());
        self
    }

    /// Filter to instances whose name contains the given substring (case-insensitive).
    pub fn name_contains(mut self, s: impl Into<String>) -> Self {
        self.name_contains = Some(s.into().to_lowercase());
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skip the first N results.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = n;
        self
    }

    /// Execute the query. Most recently accessed first, then by name.
    pub fn execute(self) -> Vec<&'s GameInstance> {
        let mut results: Vec<&GameInstance> = self
            .snapshot
            .instances()
            .filter(|i| self.matches(i))
            .collect();

        results.sort_by(|a, b| {
            b.last_accessed
                .cmp(&a.last_accessed)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        let results = results.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => results.take(limit).collect(),
            None => results.collect(),
        }
    }

    /// Count matching instances without collecting them.
    pub fn count(self) -> usize {
        self.snapshot
            .instances()
            .filter(|i| self.matches(i))
            .count()
    }

    fn matches(&self, inst: &GameInstance) -> bool {
        if let Some(status) = self.status_filter
            && inst.status != status
        {
            return false;
        }

        // All tags must match
        if !self.tag_filters.iter().all(|t| inst.tags.contains(t)) {
            return false;
        }

        if let Some(ref s) = self.name_contains
            && !inst.name.to_lowercase().contains(s)
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_core::{InstancePatch, TagSet};

    fn test_snapshot() -> Snapshot {
        let kingmaker = GameInstance::new("Kingmaker")
            .with_system("PF2e")
            .with_tags(TagSet::from_iter(["sandbox", "Pathfinder"]));
        let vaults = GameInstance::new("Abomination Vaults")
            .with_tags(TagSet::from_iter(["dungeon", "pathfinder"]));
        let strahd = GameInstance::new("Curse of Strahd").apply_patch(InstancePatch {
            status: Some(InstanceStatus::Archived),
            ..Default::default()
        });
        Snapshot::from_records([kingmaker, vaults, strahd], [], [])
    }

    #[test]
    fn query_by_status() {
        let snap = test_snapshot();
        assert_eq!(snap.query().status(InstanceStatus::Active).count(), 2);
        let archived = snap.query().status(InstanceStatus::Archived).execute();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].name, "Curse of Strahd");
    }

    #[test]
    fn query_by_tags_requires_all() {
        let snap = test_snapshot();
        assert_eq!(snap.query().tag("PATHFINDER").count(), 2);
        let results = snap.query().tag("pathfinder").tag("sandbox").execute();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Kingmaker");
        assert_eq!(snap.query().tag("  ").count(), 0);
    }

    #[test]
    fn query_by_name_contains() {
        let snap = test_snapshot();
        assert_eq!(snap.query().name_contains("VAULT").count(), 1);
    }

    #[test]
    fn most_recently_accessed_first() {
        let mut snap = test_snapshot();
        let id = snap
            .query()
            .name_contains("kingmaker")
            .execute()[0]
            .id;
        let mut later = snap.instances[&id].clone();
        later.last_accessed += chrono::Duration::hours(1);
        snap.instances.insert(id, later);
        assert_eq!(snap.query().execute()[0].name, "Kingmaker");
    }

    #[test]
    fn query_with_limit_and_offset() {
        let snap = test_snapshot();
        assert_eq!(snap.query().execute().len(), 3);
        assert_eq!(snap.query().limit(2).execute().len(), 2);
        assert_eq!(snap.query().offset(2).limit(5).execute().len(), 1);
    }
}
