//! JSON:API query parameter accumulator.
//!
//! [`ApiParams`] collects include/filter/sort/page/field directives and
//! serializes them into one query string. Directive order in the output
//! matches the order the corresponding adders are applied by the client:
//! include, filter, sort, page, then scoped field selections last.

use std::collections::BTreeMap;

use crate::{MuninnError, Result};

/// Accumulator for JSON:API query parameters.
///
/// ```rust
/// # use muninn::ApiParams;
/// let mut params = ApiParams::new();
/// params.add_include(&["field_media_image"]);
/// params.add_page_limit(50);
/// assert_eq!(params.get_query_string(), "include=field_media_image&page[limit]=50");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiParams {
    includes: Vec<String>,
    filters: Vec<(String, String)>,
    sorts: Vec<String>,
    page_limit: Option<u64>,
    page_offset: Option<u64>,
    // BTreeMap keeps per-type field selections in a stable order
    fields: BTreeMap<String, Vec<String>>,
    extras: Vec<(String, String)>,
}

impl ApiParams {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add relationship paths to the `include` directive.
    pub fn add_include(&mut self, paths: &[&str]) -> &mut Self {
        self.includes.extend(paths.iter().map(|p| p.to_string()));
        self
    }

    /// Add a `filter[<path>]=<value>` directive.
    pub fn add_filter(&mut self, path: &str, value: &str) -> &mut Self {
        self.filters.push((path.to_string(), value.to_string()));
        self
    }

    /// Add a sort field (prefix with `-` for descending).
    pub fn add_sort(&mut self, field: &str) -> &mut Self {
        self.sorts.push(field.to_string());
        self
    }

    /// Set `page[limit]`.
    pub fn add_page_limit(&mut self, limit: u64) -> &mut Self {
        self.page_limit = Some(limit);
        self
    }

    /// Set `page[offset]`.
    pub fn add_page_offset(&mut self, offset: u64) -> &mut Self {
        self.page_offset = Some(offset);
        self
    }

    /// Add a scoped field selection: `fields[<type>]=<a>,<b>`.
    pub fn add_fields(&mut self, object_name: &str, fields: &[&str]) -> &mut Self {
        self.fields
            .entry(object_name.to_string())
            .or_default()
            .extend(fields.iter().map(|f| f.to_string()));
        self
    }

    /// Drop every accumulated directive.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Hydrate an accumulator from an existing query string.
    ///
    /// Recognized directives are folded into their slots; unrecognized
    /// pairs are preserved verbatim and re-emitted before field
    /// selections.
    pub fn initialize(query_string: &str) -> Result<Self> {
        if query_string.starts_with('?') {
            return Err(MuninnError::InvalidParams(
                "leading '?' is added by the endpoint assembler".to_string(),
            ));
        }
        let mut params = Self::new();
        for pair in query_string.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| MuninnError::InvalidParams(format!("malformed pair '{pair}'")))?;
            match key {
                "include" => {
                    params.includes.extend(value.split(',').map(String::from));
                }
                "sort" => {
                    params.sorts.extend(value.split(',').map(String::from));
                }
                "page[limit]" => {
                    params.page_limit = value.parse().ok();
                }
                "page[offset]" => {
                    params.page_offset = value.parse().ok();
                }
                _ => {
                    if let Some(path) = key
                        .strip_prefix("filter[")
                        .and_then(|rest| rest.strip_suffix(']'))
                    {
                        params.filters.push((path.to_string(), value.to_string()));
                    } else if let Some(object_name) = key
                        .strip_prefix("fields[")
                        .and_then(|rest| rest.strip_suffix(']'))
                    {
                        params
                            .fields
                            .entry(object_name.to_string())
                            .or_default()
                            .extend(value.split(',').map(String::from));
                    } else {
                        params.extras.push((key.to_string(), value.to_string()));
                    }
                }
            }
        }
        Ok(params)
    }

    /// Serialize the accumulated directives into one query string (no
    /// leading `?`).
    pub fn get_query_string(&self) -> String {
        let mut parts = Vec::new();
        if !self.includes.is_empty() {
            parts.push(format!("include={}", self.includes.join(",")));
        }
        for (path, value) in &self.filters {
            parts.push(format!("filter[{path}]={value}"));
        }
        if !self.sorts.is_empty() {
            parts.push(format!("sort={}", self.sorts.join(",")));
        }
        if let Some(limit) = self.page_limit {
            parts.push(format!("page[limit]={limit}"));
        }
        if let Some(offset) = self.page_offset {
            parts.push(format!("page[offset]={offset}"));
        }
        for (key, value) in &self.extras {
            parts.push(format!("{key}={value}"));
        }
        for (object_name, fields) in &self.fields {
            parts.push(format!("fields[{object_name}]={}", fields.join(",")));
        }
        parts.join("&")
    }
}

/// Per-request parameter carrier: either a raw query string or an
/// [`ApiParams`] instance.
#[derive(Debug, Clone)]
pub enum ObjectParams {
    /// Pre-serialized query string, without a leading `?`.
    Raw(String),
    /// Structured accumulator.
    Builder(ApiParams),
}

impl ObjectParams {
    /// Serialize to a query string, validating the raw form.
    pub fn query_string(&self) -> Result<String> {
        match self {
            ObjectParams::Raw(raw) => {
                if raw.starts_with('?') {
                    Err(MuninnError::InvalidParams(
                        "param string must not start with '?'".to_string(),
                    ))
                } else {
                    Ok(raw.clone())
                }
            }
            ObjectParams::Builder(params) => Ok(params.get_query_string()),
        }
    }

    /// Convert into an accumulator so further directives (field
    /// selections) can be folded in.
    pub fn into_params(&self) -> Result<ApiParams> {
        match self {
            ObjectParams::Raw(raw) => ApiParams::initialize(raw),
            ObjectParams::Builder(params) => Ok(params.clone()),
        }
    }
}

impl From<ApiParams> for ObjectParams {
    fn from(params: ApiParams) -> Self {
        ObjectParams::Builder(params)
    }
}

impl From<&str> for ObjectParams {
    fn from(raw: &str) -> Self {
        ObjectParams::Raw(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_orders_fields_last() {
        let mut params = ApiParams::new();
        params
            .add_fields("node--recipe", &["title", "id"])
            .add_include(&["field_media_image"])
            .add_filter("status", "1");
        assert_eq!(
            params.get_query_string(),
            "include=field_media_image&filter[status]=1&fields[node--recipe]=title,id"
        );
    }

    #[test]
    fn initialize_round_trips() {
        let qs = "include=a,b&filter[status]=1&sort=-created&page[limit]=10";
        let params = ApiParams::initialize(qs).unwrap();
        assert_eq!(params.get_query_string(), qs);
    }

    #[test]
    fn initialize_rejects_leading_question_mark() {
        assert!(matches!(
            ApiParams::initialize("?include=a"),
            Err(MuninnError::InvalidParams(_))
        ));
    }

    #[test]
    fn raw_params_validate_leading_question_mark() {
        let params = ObjectParams::Raw("?include=a".to_string());
        assert!(matches!(
            params.query_string(),
            Err(MuninnError::InvalidParams(_))
        ));
    }

    #[test]
    fn clear_resets_everything() {
        let mut params = ApiParams::new();
        params.add_include(&["a"]).add_page_limit(5);
        params.clear();
        assert!(params.is_empty());
        assert_eq!(params.get_query_string(), "");
    }

    #[test]
    fn initialize_preserves_unrecognized_pairs() {
        let params = ApiParams::initialize("resourceVersion=id:3").unwrap();
        assert_eq!(params.get_query_string(), "resourceVersion=id:3");
    }
}
