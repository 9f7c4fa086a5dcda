use crate::error::ListenerError;
use hyperion_streamer_connector::Filter;
use url::form_urlencoded;

/// Parses url-encoded filters, e.g. `account=eosio&act.name=buyrambytes`.
///
/// Keys keep their order of appearance. A key given twice is rejected, and so
/// is an input without any filter.
pub fn parse_filters(raw: &str) -> Result<Vec<Filter>, ListenerError> {
    let mut filters: Vec<Filter> = Vec::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if filters.iter().any(|f| f.key == key) {
            return Err(ListenerError::DuplicateFilterKey(key.into_owned()));
        }
        filters.push(Filter::new(key, value));
    }

    if filters.is_empty() {
        return Err(ListenerError::NoFilters);
    }
    Ok(filters)
}
