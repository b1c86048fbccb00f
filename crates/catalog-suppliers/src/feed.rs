//! Item-by-item decoding of supplier product feeds.
//!
//! A feed body is first read as a list of raw JSON values, then each entry is
//! decoded on its own. Entries that do not fit the wire type are kept as
//! [`RejectedItem`]s so one malformed product cannot sink the whole pull.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decoded feed entries plus the ones that failed to decode.
#[derive(Debug)]
pub struct Feed<T> {
    pub items: Vec<T>,
    pub rejected: Vec<RejectedItem>,
}

/// A feed entry that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedItem {
    /// Zero-based position in the feed as pulled.
    pub position: usize,
    /// The entry's `id`, when it could be read at all.
    pub external_id: Option<i64>,
    pub reason: String,
}

impl RejectedItem {
    /// Label used in sync reports and error logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self.external_id {
            Some(id) => id.to_string(),
            None => format!("feed entry #{}", self.position),
        }
    }
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Feed<T> {
    /// Number of entries pulled, decoded or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.rejected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.rejected.is_empty()
    }

    /// Ids of rejected entries that still carried a readable id. Those
    /// products are present upstream and must not be soft-deleted.
    pub fn rejected_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.rejected.iter().filter_map(|r| r.external_id)
    }

    pub(crate) fn append(&mut self, other: Feed<T>) {
        self.items.extend(other.items);
        self.rejected.extend(other.rejected);
    }
}

/// Decodes each of `values` into `T`. `first_position` numbers the entries
/// when a feed is pulled in pages.
pub(crate) fn decode_items<T: DeserializeOwned>(
    values: Vec<Value>,
    first_position: usize,
    supplier: &str,
) -> Feed<T> {
    let mut feed = Feed::default();
    for (i, value) in values.into_iter().enumerate() {
        let position = first_position + i;
        let external_id = value.get("id").and_then(value_as_i64);
        match serde_json::from_value::<T>(value) {
            Ok(item) => feed.items.push(item),
            Err(e) => {
                tracing::warn!(supplier, position, ?external_id, error = %e, "skipping malformed feed entry");
                feed.rejected.push(RejectedItem {
                    position,
                    external_id,
                    reason: e.to_string(),
                });
            }
        }
    }
    feed
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Suppliers send numbers either as JSON numbers or as strings, sometimes
/// empty. Anything unreadable becomes `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

/// Optional integer ids sent as numbers or numeric strings.
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_i64))
}

/// Required ids sent as numbers or numeric strings.
pub(crate) fn flexible_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_i64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid id: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        #[serde(deserialize_with = "flexible_id")]
        id: i64,
        title: String,
        #[serde(default, deserialize_with = "lenient_f64")]
        price: Option<f64>,
    }

    #[test]
    fn malformed_entries_are_rejected_individually() {
        let values = vec![
            json!({ "id": 1, "title": "Mouse", "price": "10.5" }),
            json!({ "id": "2", "title": null }),
            json!({ "title": "sin id" }),
            json!({ "id": 4, "title": "Teclado" }),
        ];
        let feed: Feed<Item> = decode_items(values, 10, "test");

        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].price, Some(10.5));
        assert_eq!(feed.len(), 4);
        assert_eq!(feed.rejected[0].position, 11);
        assert_eq!(feed.rejected[0].label(), "2");
        assert_eq!(feed.rejected[1].label(), "feed entry #12");
        assert_eq!(feed.rejected_ids().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn string_ids_are_accepted() {
        let feed: Feed<Item> = decode_items(vec![json!({ "id": " 7 ", "title": "x" })], 0, "test");
        assert_eq!(feed.items[0].id, 7);
        assert!(feed.rejected.is_empty());
    }
}
