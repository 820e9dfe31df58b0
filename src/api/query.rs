//! List Query Module
//!
//! Typed filter/sort/limit expressions for the remote document API, plus
//! the canonical parameter object the key namespace digests. The wire form
//! follows the document store's query-string syntax, e.g.
//! `equal("call_id", ["abc"])` or `orderDesc("$createdAt")`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// == Filter ==
/// One condition a listed document must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Filter {
    /// Attribute equals the value
    Equal { attribute: String, value: Value },
    /// Attribute is strictly greater than the value
    GreaterThan { attribute: String, value: Value },
    /// Attribute is strictly less than the value
    LessThan { attribute: String, value: Value },
    /// Attribute is null/unset
    IsNull { attribute: String },
    /// Attribute is present and non-null
    IsNotNull { attribute: String },
}

impl Filter {
    /// Renders the document store's query-string form.
    fn to_query_string(&self) -> String {
        match self {
            Filter::Equal { attribute, value } => {
                format!("equal(\"{}\", [{}])", attribute, value)
            }
            Filter::GreaterThan { attribute, value } => {
                format!("greaterThan(\"{}\", [{}])", attribute, value)
            }
            Filter::LessThan { attribute, value } => {
                format!("lessThan(\"{}\", [{}])", attribute, value)
            }
            Filter::IsNull { attribute } => format!("isNull(\"{}\")", attribute),
            Filter::IsNotNull { attribute } => format!("isNotNull(\"{}\")", attribute),
        }
    }
}

// == Sort ==
/// Sort direction for a listed attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Asc,
    Desc,
}

/// Result ordering by one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub attribute: String,
    pub order: Order,
}

impl Sort {
    fn to_query_string(&self) -> String {
        match self.order {
            Order::Asc => format!("orderAsc(\"{}\")", self.attribute),
            Order::Desc => format!("orderDesc(\"{}\")", self.attribute),
        }
    }
}

// == List Query ==
/// Filter/sort/limit parameters of one list request.
///
/// Built fluently; the same logical query always canonicalizes to the same
/// [`cache_params`](ListQuery::cache_params) object no matter the order the
/// builder calls were made in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    pub limit: Option<u32>,
}

impl ListQuery {
    /// An unconstrained query: every document, server-default order and
    /// page size.
    pub fn new() -> Self {
        Self::default()
    }

    // == Builders ==
    /// Adds an equality filter.
    pub fn equal(mut self, attribute: &str, value: Value) -> Self {
        self.filters.push(Filter::Equal {
            attribute: attribute.to_string(),
            value,
        });
        self
    }

    /// Adds a strictly-greater-than filter.
    pub fn greater_than(mut self, attribute: &str, value: Value) -> Self {
        self.filters.push(Filter::GreaterThan {
            attribute: attribute.to_string(),
            value,
        });
        self
    }

    /// Adds a strictly-less-than filter.
    pub fn less_than(mut self, attribute: &str, value: Value) -> Self {
        self.filters.push(Filter::LessThan {
            attribute: attribute.to_string(),
            value,
        });
        self
    }

    /// Requires the attribute to be null/unset.
    pub fn is_null(mut self, attribute: &str) -> Self {
        self.filters.push(Filter::IsNull {
            attribute: attribute.to_string(),
        });
        self
    }

    /// Requires the attribute to be present and non-null.
    pub fn is_not_null(mut self, attribute: &str) -> Self {
        self.filters.push(Filter::IsNotNull {
            attribute: attribute.to_string(),
        });
        self
    }

    /// Sorts results ascending by `attribute`.
    pub fn order_asc(mut self, attribute: &str) -> Self {
        self.sort = Some(Sort {
            attribute: attribute.to_string(),
            order: Order::Asc,
        });
        self
    }

    /// Sorts results descending by `attribute`.
    pub fn order_desc(mut self, attribute: &str) -> Self {
        self.sort = Some(Sort {
            attribute: attribute.to_string(),
            order: Order::Desc,
        });
        self
    }

    /// Caps the result count.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    // == Wire Form ==
    /// Renders the query strings sent as `queries[]` request parameters.
    pub fn to_query_strings(&self) -> Vec<String> {
        let mut queries: Vec<String> =
            self.filters.iter().map(Filter::to_query_string).collect();
        if let Some(sort) = &self.sort {
            queries.push(sort.to_query_string());
        }
        if let Some(limit) = self.limit {
            queries.push(format!("limit({})", limit));
        }
        queries
    }

    // == Cache Params ==
    /// Canonical parameter object for the cache key digest.
    ///
    /// Filters are rendered to their wire strings and sorted, so two
    /// queries built with the same conditions in any order digest
    /// identically, while any difference in filter content, sort, or limit
    /// changes the digest.
    pub fn cache_params(&self) -> Value {
        let mut filters: Vec<String> =
            self.filters.iter().map(Filter::to_query_string).collect();
        filters.sort();

        json!({
            "filters": filters,
            "sort": self.sort.as_ref().map(Sort::to_query_string),
            "limit": self.limit,
        })
    }
}
