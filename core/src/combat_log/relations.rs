use std::collections::BTreeMap;

use serde::Serialize;

use super::event::EventId;

/// Named relations of one event: relation name -> ordered set of event ids.
///
/// Ids keep insertion order and are never duplicated under one name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RelationMap(BTreeMap<String, Vec<EventId>>);

impl RelationMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of edges across all relation names
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn contains(&self, relation: &str) -> bool {
        self.0.get(relation).is_some_and(|ids| !ids.is_empty())
    }

    pub fn get(&self, relation: &str) -> &[EventId] {
        self.0.get(relation).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EventId])> {
        self.0.iter().map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// Returns false if the edge already existed.
    pub(crate) fn insert(&mut self, relation: &str, id: EventId) -> bool {
        let ids = match self.0.get_mut(relation) {
            Some(ids) => ids,
            None => self.0.entry(relation.to_string()).or_default(),
        };
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        true
    }
}

/// One directed edge of the relation graph, for dumps and comparisons
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RelationEdge {
    pub from: EventId,
    pub relation: String,
    pub to: EventId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_rejects_duplicates() {
        let mut map = RelationMap::default();
        assert!(map.insert("Bounced", EventId(4)));
        assert!(map.insert("Bounced", EventId(2)));
        assert!(!map.insert("Bounced", EventId(4)));
        assert!(map.insert("FromHardcast", EventId(1)));

        assert_eq!(map.get("Bounced"), &[EventId(4), EventId(2)]);
        assert_eq!(map.len(), 3);
        assert!(map.contains("FromHardcast"));
        assert!(!map.contains("FromDM"));
        assert!(map.get("FromDM").is_empty());
    }
}
