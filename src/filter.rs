//! Event filters
//!
//! A [`Filter`] is the NIP-01 predicate a client sends in a `REQ`. Every
//! constraint present on a filter must hold for an event to match, and a
//! [`Filters`] set matches when any one of its filters does.
//!
//! Set-valued fields are kept as ordered sets so that two filters listing the
//! same values in a different order compare (and hash) equal. `limit` only
//! bounds historical queries, so it takes no part in matching or equality.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// A single subscription filter
///
/// An empty `ids`, `authors`, `kinds` or tag value list places no constraint
/// on that field, whether it was omitted on the wire or sent as `[]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawFilter", into = "RawFilter")]
pub struct Filter {
    /// Accepted event ids
    pub ids: BTreeSet<String>,
    /// Accepted author public keys
    pub authors: BTreeSet<String>,
    /// Accepted event kinds
    pub kinds: BTreeSet<u32>,
    /// Single-letter tag constraints (`#e`, `#p`, ...)
    pub tags: BTreeMap<char, BTreeSet<String>>,
    /// Oldest accepted `created_at`, inclusive
    pub since: Option<u64>,
    /// Newest accepted `created_at`, inclusive
    pub until: Option<u64>,
    /// Maximum number of stored events to return on the initial query
    pub limit: Option<usize>,
}

impl Filter {
    /// Create a filter that matches every event
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an event id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.insert(id.into());
        self
    }

    /// Accept an author
    pub fn author(mut self, pubkey: impl Into<String>) -> Self {
        self.authors.insert(pubkey.into());
        self
    }

    /// Accept an event kind
    pub fn kind(mut self, kind: u32) -> Self {
        self.kinds.insert(kind);
        self
    }

    /// Accept several event kinds
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u32>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    /// Require a tag `name` carrying one of `values`
    pub fn tag<I, S>(mut self, name: char, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .entry(name)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Set the lower time bound
    pub fn since(mut self, since: u64) -> Self {
        self.since = Some(since);
        self
    }

    /// Set the upper time bound
    pub fn until(mut self, until: u64) -> Self {
        self.until = Some(until);
        self
    }

    /// Set the initial query limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether `event` satisfies every constraint of this filter
    pub fn matches(&self, event: &Event) -> bool {
        if !self.ids.is_empty() && !self.ids.contains(event.id.as_str()) {
            return false;
        }
        if !self.authors.is_empty() && !self.authors.contains(event.pubkey.as_str()) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind) {
            return false;
        }
        if matches!(self.since, Some(since) if event.created_at < since) {
            return false;
        }
        if matches!(self.until, Some(until) if event.created_at > until) {
            return false;
        }

        self.tags.iter().all(|(name, values)| {
            if values.is_empty() {
                return true;
            }
            let mut buf = [0u8; 4];
            let name: &str = name.encode_utf8(&mut buf);
            let found = event.tag_values(name).any(|v| values.contains(v));
            found
        })
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids
            && self.authors == other.authors
            && self.kinds == other.kinds
            && self.tags == other.tags
            && self.since == other.since
            && self.until == other.until
    }
}

impl Eq for Filter {}

// Must stay in line with `PartialEq`: `limit` is left out of both.
impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ids.hash(state);
        self.authors.hash(state);
        self.kinds.hash(state);
        self.tags.hash(state);
        self.since.hash(state);
        self.until.hash(state);
    }
}

/// Wire form of a filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawFilter {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    ids: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    authors: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    kinds: BTreeSet<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    since: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    until: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    /// `#x` tag constraints plus anything unrecognised
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<RawFilter> for Filter {
    type Error = String;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        let mut tags = BTreeMap::new();

        for (key, value) in raw.extra {
            let Some(name) = key.strip_prefix('#') else {
                continue;
            };
            let mut chars = name.chars();
            let (Some(letter), None) = (chars.next(), chars.next()) else {
                continue;
            };
            let values: BTreeSet<String> = serde_json::from_value(value)
                .map_err(|e| format!("invalid values for tag filter {}: {}", key, e))?;
            tags.insert(letter, values);
        }

        Ok(Filter {
            ids: raw.ids,
            authors: raw.authors,
            kinds: raw.kinds,
            tags,
            since: raw.since,
            until: raw.until,
            limit: raw.limit,
        })
    }
}

impl From<Filter> for RawFilter {
    fn from(filter: Filter) -> Self {
        let extra = filter
            .tags
            .into_iter()
            .map(|(letter, values)| {
                let values = values.into_iter().map(serde_json::Value::String).collect();
                (format!("#{}", letter), serde_json::Value::Array(values))
            })
            .collect();

        RawFilter {
            ids: filter.ids,
            authors: filter.authors,
            kinds: filter.kinds,
            since: filter.since,
            until: filter.until,
            limit: filter.limit,
            extra,
        }
    }
}

/// The ordered filter set of one subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(Vec<Filter>);

impl Filters {
    /// Create a filter set
    pub fn new(filters: Vec<Filter>) -> Self {
        Self(filters)
    }

    /// True when at least one filter matches `event`
    pub fn matches(&self, event: &Event) -> bool {
        self.0.iter().any(|f| f.matches(event))
    }

    /// Number of filters in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty (an empty set matches nothing)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the filters in client order
    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.0.iter()
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Self(filters)
    }
}

impl From<Filter> for Filters {
    fn from(filter: Filter) -> Self {
        Self(vec![filter])
    }
}

impl FromIterator<Filter> for Filters {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Filters {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    fn event(kind: u32, created_at: u64) -> Event {
        Event {
            id: "id1".into(),
            pubkey: "alice".into(),
            created_at,
            kind,
            tags: vec![vec!["e".into(), "root".into()], vec!["p".into(), "bob".into()]],
            content: String::new(),
            sig: "sig".into(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&event(1, 10)));
        assert!(Filter::new().matches(&event(30023, 0)));
    }

    #[test]
    fn test_field_constraints_are_anded() {
        let filter = Filter::new().kind(1).author("alice");
        assert!(filter.matches(&event(1, 10)));
        assert!(!filter.matches(&event(2, 10)));

        let filter = Filter::new().kind(1).author("carol");
        assert!(!filter.matches(&event(1, 10)));

        let filter = Filter::new().id("other");
        assert!(!filter.matches(&event(1, 10)));
    }

    #[test]
    fn test_time_bounds_are_inclusive() {
        let filter = Filter::new().since(10).until(20);

        assert!(!filter.matches(&event(1, 9)));
        assert!(filter.matches(&event(1, 10)));
        assert!(filter.matches(&event(1, 20)));
        assert!(!filter.matches(&event(1, 21)));
    }

    #[test]
    fn test_tag_constraints() {
        assert!(Filter::new().tag('e', ["root", "x"]).matches(&event(1, 0)));
        assert!(!Filter::new().tag('e', ["x"]).matches(&event(1, 0)));
        assert!(!Filter::new().tag('t', ["nostr"]).matches(&event(1, 0)));

        let both = Filter::new().tag('e', ["root"]).tag('p', ["bob"]);
        assert!(both.matches(&event(1, 0)));
    }

    #[test]
    fn test_filters_match_any() {
        let filters: Filters = vec![Filter::new().kind(7), Filter::new().kind(1)].into();

        assert!(filters.matches(&event(1, 0)));
        assert!(filters.matches(&event(7, 0)));
        assert!(!filters.matches(&event(3, 0)));
        assert!(!Filters::default().matches(&event(1, 0)));
    }

    #[test]
    fn test_equality_ignores_order_and_limit() {
        let a = Filter::new().kinds([1, 7]).author("alice").limit(10);
        let b = Filter::new().author("alice").kinds([7, 1]);

        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
        assert!(set.insert(Filter::new().kind(1)));
    }

    #[test]
    fn test_deserialize_nip01() {
        let filter: Filter = serde_json::from_value(json!({
            "kinds": [1, 6],
            "authors": ["alice"],
            "#e": ["root"],
            "#relay": ["ignored"],
            "search": "ignored too",
            "since": 100,
            "limit": 20
        }))
        .unwrap();

        assert_eq!(filter.kinds, BTreeSet::from([1, 6]));
        assert_eq!(filter.tags.len(), 1);
        assert!(filter.tags[&'e'].contains("root"));
        assert_eq!(filter.since, Some(100));
        assert_eq!(filter.limit, Some(20));
    }

    #[test]
    fn test_present_empty_lists_do_not_constrain() {
        let filter: Filter =
            serde_json::from_value(json!({ "ids": [], "kinds": [], "#e": [] })).unwrap();

        assert!(filter.matches(&event(1, 0)));
        assert!(filter.matches(&event(30023, 5)));
    }

    #[test]
    fn test_deserialize_rejects_bad_tag_values() {
        let result = serde_json::from_value::<Filter>(json!({ "#e": "root" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_nip01() {
        let filter = Filter::new().kind(1).tag('p', ["bob"]).until(50);

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "kinds": [1], "#p": ["bob"], "until": 50 })
        );
    }
}
