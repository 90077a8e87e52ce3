//! Query parameters and list filtering

use crate::core::error::ValidationError;
use crate::entities::{Category, Priority, ProcurementRequest, Status};
use serde::Deserialize;

/// Raw query string of `GET /api/requests`
///
/// All parameters are optional and empty values count as absent.
///
/// # Example
/// ```text
/// GET /api/requests?status=Pending&priority=High
/// GET /api/requests?search=chicken
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    /// Parse the parameters into a typed filter
    ///
    /// Unknown enum values are rejected rather than matching nothing.
    pub fn into_filter(self) -> Result<RequestFilter, ValidationError> {
        Ok(RequestFilter {
            status: parse_param(self.status)?,
            priority: parse_param(self.priority)?,
            category: parse_param(self.category)?,
            search: self.search.filter(|s| !s.is_empty()),
        })
    }
}

fn parse_param<T>(raw: Option<String>) -> Result<Option<T>, ValidationError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Conjunction of optional criteria applied by `RequestStore::list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    /// Case-insensitive literal substring, matched against any of
    /// [`SEARCH_FIELDS`]
    pub search: Option<String>,
}

/// Wire names of the fields covered by `search`
pub const SEARCH_FIELDS: [&str; 4] = ["itemNameEn", "itemNameZh", "requestorName", "department"];

impl RequestFilter {
    pub fn is_empty(&self) -> bool {
        *self == RequestFilter::default()
    }

    /// Evaluate the filter against one record
    pub fn matches(&self, request: &ProcurementRequest) -> bool {
        self.status.is_none_or(|s| request.status == s)
            && self.priority.is_none_or(|p| request.priority == p)
            && self.category.is_none_or(|c| request.category == c)
            && self.search.as_deref().is_none_or(|needle| {
                let needle = needle.to_lowercase();
                [
                    &request.item_name_en,
                    &request.item_name_zh,
                    &request.requestor_name,
                    &request.department,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
    }
}

/// Order records newest first (by `created_at`)
pub fn sort_newest_first(requests: &mut [ProcurementRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}
