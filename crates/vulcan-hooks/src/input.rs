//! Query input sent as the `$input` variable of multi queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of items fetched when no source sets a limit.
pub const DEFAULT_LIMIT: u64 = 20;

/// Selection, ordering and pagination of a multi query.
///
/// Every field is optional so inputs coming from several sources can be
/// layered with [`QueryInput::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Ask the server to compute `totalCount`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_total: Option<bool>,
    /// Let the server answer from its own cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cache: Option<bool>,
}

impl QueryInput {
    /// Built-in defaults: `{limit: 20, enableTotal: true, enableCache: false}`.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            enable_total: Some(true),
            enable_cache: Some(false),
            ..Self::default()
        }
    }

    /// Input carrying only a limit.
    #[must_use]
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Layer `other` over `self`.
    ///
    /// Fields set in `other` win; fields it leaves unset never clear. `filter`
    /// and `sort` objects merge key by key, recursively.
    pub fn merge(&mut self, other: &Self) {
        merge_value_field(&mut self.filter, other.filter.as_ref());
        merge_value_field(&mut self.sort, other.sort.as_ref());
        if other.search.is_some() {
            self.search.clone_from(&other.search);
        }
        self.offset = other.offset.or(self.offset);
        self.limit = other.limit.or(self.limit);
        self.enable_total = other.enable_total.or(self.enable_total);
        self.enable_cache = other.enable_cache.or(self.enable_cache);
    }

    /// Fold `sources` in precedence order, later sources winning.
    #[must_use]
    pub fn merged<'a>(sources: impl IntoIterator<Item = &'a Self>) -> Self {
        sources.into_iter().fold(Self::default(), |mut acc, source| {
            acc.merge(source);
            acc
        })
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn merge_value_field(target: &mut Option<Value>, source: Option<&Value>) {
    let Some(source) = source else {
        return;
    };
    match target {
        Some(existing) => deep_merge(existing, source),
        None => *target = Some(source.clone()),
    }
}

/// Merge `source` into `target`: objects recurse, everything else overwrites.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}
