//! Cache keys, stale times and invalidation sets for an external query
//! cache.
//!
//! # Design
//! The core stores nothing. It hands the caching runtime three things:
//! - a `QueryKey` per logical query, compared structurally (`Eq`/`Hash`);
//! - a stale time per `ResourceClass`, during which a cached result is served
//!   without calling the façade again;
//! - for every `Mutation`, the keys to invalidate once it succeeds.
//!
//! Filter objects inside keys are stored as sorted maps built from the same
//! `ToQuery` output the URL builder uses, so two filters with the same
//! content always produce the same key. Invalidation is by prefix: the
//! family key `["boards"]` covers every board list, detail and count key.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::query::ToQuery;

/// One element of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeySegment {
    Text(String),
    Number(u64),
    Filters(BTreeMap<String, String>),
}

impl From<&str> for KeySegment {
    fn from(s: &str) -> Self {
        KeySegment::Text(s.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(s: String) -> Self {
        KeySegment::Text(s)
    }
}

impl From<u32> for KeySegment {
    fn from(n: u32) -> Self {
        KeySegment::Number(u64::from(n))
    }
}

impl From<Uuid> for KeySegment {
    fn from(id: Uuid) -> Self {
        KeySegment::Text(id.to_string())
    }
}

/// Ordered, structurally comparable cache key. Serializes as a JSON array,
/// e.g. `["techniques","list",{"level":"3"}]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    /// The family key: prefix of every key for `family`.
    pub fn family(family: Family) -> Self {
        QueryKey(vec![KeySegment::from(family.as_str())])
    }

    fn with(mut self, segment: impl Into<KeySegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Append a filter object; an empty filter adds nothing, so "no filter"
    /// and "all-absent filter" share a key.
    fn with_filters(mut self, filters: &impl ToQuery) -> Self {
        let query = filters.to_query();
        if !query.is_empty() {
            let map = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.0.push(KeySegment::Filters(map));
        }
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    /// Prefix match, as used for invalidation.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn list(family: Family, filters: &impl ToQuery) -> Self {
        Self::family(family).with("list").with_filters(filters)
    }

    pub fn detail(family: Family, id: impl Into<KeySegment>) -> Self {
        Self::family(family).with("detail").with(id)
    }

    pub fn random(family: Family, filters: &impl ToQuery) -> Self {
        Self::family(family).with("random").with_filters(filters)
    }

    pub fn counts(family: Family) -> Self {
        Self::family(family).with("counts")
    }

    pub fn health() -> Self {
        Self::family(Family::Health)
    }

    pub fn daily_today() -> Self {
        Self::family(Family::Dailies).with("today")
    }

    pub fn daily_by_date(date: &str) -> Self {
        Self::family(Family::Dailies).with("date").with(date)
    }

    pub fn practice_random(technique: u32) -> Self {
        Self::family(Family::Practices).with("random").with(technique)
    }

    pub fn subscriptions(user_id: &str) -> Self {
        Self::family(Family::Users).with("subscriptions").with(user_id)
    }

    pub fn solve(params: &impl ToQuery) -> Self {
        Self::family(Family::Solver).with("solve").with_filters(params)
    }

    pub fn validate(params: &impl ToQuery) -> Self {
        Self::family(Family::Solver).with("validate").with_filters(params)
    }

    pub fn generate(params: &impl ToQuery) -> Self {
        Self::family(Family::Solver).with("generate").with_filters(params)
    }

    pub fn stats() -> Self {
        Self::family(Family::Gamification).with("stats")
    }

    pub fn badges() -> Self {
        Self::family(Family::Gamification).with("badges")
    }

    pub fn history(page: &impl ToQuery) -> Self {
        Self::family(Family::Gamification).with("history").with_filters(page)
    }

    /// Staleness for this key, derived from its family and sub-resource.
    pub fn stale_time(&self) -> Duration {
        self.resource_class().stale_time()
    }

    pub fn resource_class(&self) -> ResourceClass {
        let text = |i: usize| match self.0.get(i) {
            Some(KeySegment::Text(s)) => Some(s.as_str()),
            _ => None,
        };
        match (text(0), text(1)) {
            (_, Some("random")) | (_, Some("history")) => ResourceClass::Volatile,
            (Some("gamification"), Some("badges")) => ResourceClass::Reference,
            (Some("gamification"), _) => ResourceClass::UserState,
            (Some(family), _) => Family::parse(family)
                .map(Family::resource_class)
                .unwrap_or(ResourceClass::Volatile),
            (None, _) => ResourceClass::Volatile,
        }
    }
}

/// Resource families; the first segment of every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Health,
    Levels,
    Techniques,
    Learning,
    Boards,
    Dailies,
    Challenges,
    Users,
    Solver,
    Practices,
    Examples,
    Gamification,
}

impl Family {
    pub const ALL: [Family; 12] = [
        Family::Health,
        Family::Levels,
        Family::Techniques,
        Family::Learning,
        Family::Boards,
        Family::Dailies,
        Family::Challenges,
        Family::Users,
        Family::Solver,
        Family::Practices,
        Family::Examples,
        Family::Gamification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Health => "health",
            Family::Levels => "levels",
            Family::Techniques => "techniques",
            Family::Learning => "learning",
            Family::Boards => "boards",
            Family::Dailies => "dailies",
            Family::Challenges => "challenges",
            Family::Users => "users",
            Family::Solver => "solver",
            Family::Practices => "practices",
            Family::Examples => "examples",
            Family::Gamification => "gamification",
        }
    }

    pub fn parse(s: &str) -> Option<Family> {
        Family::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// Default class for the family's non-random, non-history keys.
    pub fn resource_class(self) -> ResourceClass {
        match self {
            Family::Health => ResourceClass::Health,
            Family::Levels | Family::Techniques | Family::Learning | Family::Examples => {
                ResourceClass::Reference
            }
            Family::Boards | Family::Dailies | Family::Challenges | Family::Practices => {
                ResourceClass::Generated
            }
            Family::Users | Family::Gamification => ResourceClass::UserState,
            Family::Solver => ResourceClass::Volatile,
        }
    }
}

/// Staleness classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    /// Health/status endpoints.
    Health,
    /// Levels, techniques, learning content, examples, badge catalog.
    Reference,
    /// Boards, dailies, challenges, practices.
    Generated,
    /// Subscriptions, entitlements, stats.
    UserState,
    /// Random picks, history, solver output: never fresh.
    Volatile,
}

impl ResourceClass {
    pub fn stale_time(self) -> Duration {
        match self {
            ResourceClass::Health => Duration::from_secs(60),
            ResourceClass::Reference => Duration::from_secs(10 * 60),
            ResourceClass::Generated => Duration::from_secs(5 * 60),
            ResourceClass::UserState => Duration::from_secs(2 * 60),
            ResourceClass::Volatile => Duration::ZERO,
        }
    }
}

/// Every mutating operation, with the identifier when the call knows one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateLevel,
    UpdateLevel(u32),
    DeleteLevel(u32),
    CreateTechnique,
    UpdateTechnique(u32),
    DeleteTechnique(u32),
    CreateLearning,
    UpdateLearning(Uuid),
    DeleteLearning(Uuid),
    CreateBoard,
    UpdateBoard(Uuid),
    DeleteBoard(Uuid),
    CreateDaily,
    UpdateDaily(Uuid),
    DeleteDaily(Uuid),
    CreateChallenge,
    UpdateChallenge(Uuid),
    DeleteChallenge(Uuid),
    CreatePractice,
    DeleteAllPractices,
    CreateExample,
    StartPlay,
    FinishPlay,
}

impl Mutation {
    /// Keys to invalidate after the mutation succeeds: always the family key,
    /// plus the item's detail key when an identifier is known.
    pub fn invalidates(&self) -> Vec<QueryKey> {
        use Mutation::*;
        let family = |f| QueryKey::family(f);
        match self {
            CreateLevel => vec![family(Family::Levels)],
            UpdateLevel(n) | DeleteLevel(n) => {
                vec![family(Family::Levels), QueryKey::detail(Family::Levels, *n)]
            }
            CreateTechnique => vec![family(Family::Techniques)],
            UpdateTechnique(n) | DeleteTechnique(n) => vec![
                family(Family::Techniques),
                QueryKey::detail(Family::Techniques, *n),
            ],
            CreateLearning => vec![family(Family::Learning)],
            UpdateLearning(id) | DeleteLearning(id) => {
                vec![family(Family::Learning), QueryKey::detail(Family::Learning, *id)]
            }
            CreateBoard => vec![family(Family::Boards)],
            UpdateBoard(id) | DeleteBoard(id) => {
                vec![family(Family::Boards), QueryKey::detail(Family::Boards, *id)]
            }
            CreateDaily => vec![family(Family::Dailies)],
            UpdateDaily(id) | DeleteDaily(id) => {
                vec![family(Family::Dailies), QueryKey::detail(Family::Dailies, *id)]
            }
            CreateChallenge => vec![family(Family::Challenges)],
            UpdateChallenge(id) | DeleteChallenge(id) => vec![
                family(Family::Challenges),
                QueryKey::detail(Family::Challenges, *id),
            ],
            CreatePractice | DeleteAllPractices => {
                vec![family(Family::Practices), QueryKey::counts(Family::Practices)]
            }
            CreateExample => vec![family(Family::Examples), QueryKey::counts(Family::Examples)],
            StartPlay | FinishPlay => vec![
                QueryKey::stats(),
                QueryKey::family(Family::Gamification).with("history"),
            ],
        }
    }

    /// True when `key` is covered by this mutation's invalidation set.
    pub fn invalidates_key(&self, key: &QueryKey) -> bool {
        self.invalidates().iter().any(|prefix| key.starts_with(prefix))
    }
}
