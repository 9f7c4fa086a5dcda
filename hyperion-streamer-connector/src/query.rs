use crate::{config::DEFAULT_PAGE_LIMIT, cursor::Cursor};
use url::form_urlencoded;

/// Path of the action-history endpoint, relative to the node's base URL.
pub const GET_ACTIONS_PATH: &str = "/v2/history/get_actions";

/// A key/value term appended verbatim to every `get_actions` query,
/// e.g. `account=eosio` or `act.name=buyrambytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub key: String,
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The query terms of one `get_actions` request, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionQuery {
    terms: Vec<(String, String)>,
}

impl ActionQuery {
    /// Builds an ascending query for everything after the cursor.
    pub fn new(cursor: &Cursor, page_limit: usize, filters: &[Filter]) -> Self {
        let limit = if page_limit == 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            page_limit
        };

        let mut terms = Vec::with_capacity(3 + filters.len());
        terms.push(("sort".to_string(), "asc".to_string()));
        terms.push(("limit".to_string(), limit.to_string()));
        terms.push(("global_sequence".to_string(), cursor.range()));
        terms.extend(
            filters
                .iter()
                .map(|filter| (filter.key.clone(), filter.value.clone())),
        );

        Self { terms }
    }

    pub fn terms(&self) -> &[(String, String)] {
        &self.terms
    }

    /// Looks up the first term with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.terms
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Form-urlencoded query string.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.terms.iter())
            .finish()
    }

    /// Full request URL against a node base URL (no trailing slash).
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}?{}", base_url, GET_ACTIONS_PATH, self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_terms_in_wire_order() {
        let query = ActionQuery::new(
            &Cursor::resume_from(100),
            250,
            &[
                Filter::new("account", "eosio"),
                Filter::new("act.name", "buyrambytes"),
            ],
        );

        let keys: Vec<&str> = query.terms().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["sort", "limit", "global_sequence", "account", "act.name"]);
        assert_eq!(query.get("sort"), Some("asc"));
        assert_eq!(query.get("limit"), Some("250"));
        assert_eq!(query.get("global_sequence"), Some("101-9223372036854775807"));
        assert_eq!(query.get("act.name"), Some("buyrambytes"));
    }

    #[test]
    fn zero_limit_uses_default() {
        let query = ActionQuery::new(&Cursor::resume_from(0), 0, &[]);
        assert_eq!(query.get("limit"), Some("100"));
    }

    #[test]
    fn url_targets_get_actions() {
        let query = ActionQuery::new(
            &Cursor::resume_from(0),
            10,
            &[Filter::new("account", "alice bob")],
        );

        assert_eq!(
            query.url("https://wax.example.io"),
            "https://wax.example.io/v2/history/get_actions?sort=asc&limit=10&global_sequence=1-9223372036854775807&account=alice+bob"
        );
    }
}
