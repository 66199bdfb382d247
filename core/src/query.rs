//! Deterministic path + query-string assembly.
//!
//! # Design
//! Parameters live in a `BTreeMap`, so iteration order is ascending by key no
//! matter how they were inserted. The solver endpoints depend on that order
//! on the wire, and the cache-key model depends on it for equality.
//!
//! Values go through `form_urlencoded` byte serialization, after which
//! `%2C` is turned back into a literal comma: comma-separated pencil-mark
//! and technique lists must reach the server unescaped.

use std::collections::BTreeMap;
use std::fmt;

/// A query parameter value. `None` means "absent" and drops the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryValue(String);

impl QueryValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! query_value_from_display {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue(v.to_string())
            }
        })*
    };
}

query_value_from_display!(&str, String, &String, bool, u8, u16, u32, u64, i32, i64, usize, uuid::Uuid);

/// Parameter bag with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryParams {
    params: BTreeMap<String, QueryValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`; a repeated key keeps the last value.
    pub fn set(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Set `key` only when `value` is present. An empty string is present.
    pub fn set_opt<V: Into<QueryValue>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Join a list with commas; an empty list counts as absent.
    pub fn set_list<I, V>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            self
        } else {
            self.set(key, joined)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(QueryValue::as_str)
    }

    /// Key/value pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encoded query string without the leading `?`.
    pub fn encode(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v.as_str())))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path` followed by `?query` when there is anything to append.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.encode())
        }
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = (&'a String, &'a QueryValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Anything that contributes query parameters, typically a filter struct.
pub trait ToQuery {
    fn to_query(&self) -> QueryParams;
}

impl ToQuery for QueryParams {
    fn to_query(&self) -> QueryParams {
        self.clone()
    }
}

impl<T: ToQuery> ToQuery for Option<T> {
    fn to_query(&self) -> QueryParams {
        self.as_ref().map(ToQuery::to_query).unwrap_or_default()
    }
}

fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace("%2C", ",")
}

/// Percent-encode a single path segment.
pub fn encode_path_segment(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted_regardless_of_insertion_order() {
        let q = QueryParams::new()
            .set("user", "u")
            .set("autoPencilmarks", true)
            .set("original", "o")
            .set("filters", "a");
        assert_eq!(q.encode(), "autoPencilmarks=true&filters=a&original=o&user=u");
    }

    #[test]
    fn commas_survive_encoding() {
        let q = QueryParams::new().set("pencilmarks", "1,2,3");
        let encoded = q.encode();
        assert_eq!(encoded, "pencilmarks=1,2,3");

        let decoded: Vec<(String, String)> = form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(decoded, vec![("pencilmarks".to_string(), "1,2,3".to_string())]);
    }

    #[test]
    fn other_characters_are_escaped() {
        let q = QueryParams::new().set("q", "a b&c=d/é");
        assert_eq!(q.encode(), "q=a+b%26c%3Dd%2F%C3%A9");
    }

    #[test]
    fn absent_values_are_omitted_but_empty_strings_kept() {
        let q = QueryParams::new()
            .set_opt("level", None::<u32>)
            .set_opt("name", Some(""));
        assert_eq!(q.encode(), "name=");
    }

    #[test]
    fn empty_bag_adds_no_separator() {
        let q = QueryParams::new().set_opt("level", None::<u32>);
        assert_eq!(q.append_to("/api/v1/boards"), "/api/v1/boards");
    }

    #[test]
    fn append_to_joins_with_question_mark() {
        let q = QueryParams::new().set("offset", 0u32).set("limit", 20u32);
        assert_eq!(
            q.append_to("/api/v1/gamification/history"),
            "/api/v1/gamification/history?limit=20&offset=0"
        );
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let q = QueryParams::new().set("level", 1u32).set("level", 2u32);
        assert_eq!(q.encode(), "level=2");
    }

    #[test]
    fn list_values_join_with_commas() {
        let q = QueryParams::new()
            .set_list("techniques", [3u32, 1, 2])
            .set_list("empty", Vec::<u32>::new());
        assert_eq!(q.encode(), "techniques=3,1,2");
    }

    #[test]
    fn path_segment_encoding() {
        assert_eq!(encode_path_segment("auth0|abc def"), "auth0%7Cabc%20def");
    }
}
