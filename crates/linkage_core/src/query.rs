//! Query parameters: filtering, sorting, grouping, pagination, sparse
//! fieldsets and inclusion.
//!
//! The transport hands over a raw `key -> values` map. Keys look like
//! `filter[users][name]` or `page[offset]`; the member prefix is matched
//! case-insensitively and keys with any other prefix are ignored. Controllers
//! treat the result as opaque and pass it through to the resource repository.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

/// Raw query parameters as decoded by the transport.
pub type RawQueryParams = BTreeMap<String, BTreeSet<String>>;

/// Recognised top-level query parameter members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryParamMember {
    Filter,
    Sort,
    Group,
    Page,
    Fields,
    Include,
}

impl QueryParamMember {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryParamMember::Filter => "filter",
            QueryParamMember::Sort => "sort",
            QueryParamMember::Group => "group",
            QueryParamMember::Page => "page",
            QueryParamMember::Fields => "fields",
            QueryParamMember::Include => "include",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PaginationKey {
    Offset,
    Limit,
}

impl fmt::Display for PaginationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationKey::Offset => f.write_str("offset"),
            PaginationKey::Limit => f.write_str("limit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamsError {
    #[error("malformed query parameter key: {0}")]
    MalformedKey(String),

    #[error("invalid sort direction '{value}' for {key}")]
    InvalidSortDirection { key: String, value: String },

    #[error("query parameter {0} accepts a single value")]
    MultipleValues(String),

    #[error("unknown pagination key: {0}")]
    UnknownPaginationKey(String),

    #[error("invalid pagination value '{value}' for {key}")]
    InvalidPagination { key: PaginationKey, value: String },
}

/// Parsed query parameters. Maps are keyed by resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// resource type -> field path -> accepted values
    pub filters: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
    /// resource type -> field path -> direction
    pub sorting: BTreeMap<String, BTreeMap<String, SortDirection>>,
    pub grouping: BTreeMap<String, BTreeSet<String>>,
    pub pagination: BTreeMap<PaginationKey, u64>,
    pub included_fields: BTreeMap<String, BTreeSet<String>>,
    /// resource type -> relationship paths (dot separated)
    pub included_relations: BTreeMap<String, BTreeSet<String>>,
}

impl QueryParams {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Builds [`QueryParams`] from [`RawQueryParams`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParamsBuilder;

impl QueryParamsBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, raw: &RawQueryParams) -> Result<QueryParams, QueryParamsError> {
        let mut params = QueryParams::default();

        for (key, values, path) in select_member(raw, QueryParamMember::Filter) {
            let (resource, field) = split_resource_and_field(key, path?)?;
            params
                .filters
                .entry(resource)
                .or_default()
                .entry(field)
                .or_default()
                .extend(values.iter().cloned());
        }

        for (key, values, path) in select_member(raw, QueryParamMember::Sort) {
            let (resource, field) = split_resource_and_field(key, path?)?;
            let direction = single_value(key, values)
                .and_then(|value| parse_direction(key, value))?;
            params
                .sorting
                .entry(resource)
                .or_default()
                .insert(field, direction);
        }

        for (key, values, path) in select_member(raw, QueryParamMember::Group) {
            let resource = single_segment(key, path?)?;
            params
                .grouping
                .entry(resource)
                .or_default()
                .extend(split_values(values));
        }

        for (key, values, path) in select_member(raw, QueryParamMember::Page) {
            let name = single_segment(key, path?)?;
            let page_key = match name.to_ascii_lowercase().as_str() {
                "offset" => PaginationKey::Offset,
                "limit" => PaginationKey::Limit,
                _ => return Err(QueryParamsError::UnknownPaginationKey(key.clone())),
            };
            let value = single_value(key, values)?;
            let parsed = value
                .parse::<u64>()
                .map_err(|_| QueryParamsError::InvalidPagination {
                    key: page_key,
                    value: value.clone(),
                })?;
            params.pagination.insert(page_key, parsed);
        }

        for (key, values, path) in select_member(raw, QueryParamMember::Fields) {
            let resource = single_segment(key, path?)?;
            params
                .included_fields
                .entry(resource)
                .or_default()
                .extend(split_values(values));
        }

        for (key, values, path) in select_member(raw, QueryParamMember::Include) {
            let resource = single_segment(key, path?)?;
            params
                .included_relations
                .entry(resource)
                .or_default()
                .extend(split_values(values));
        }

        Ok(params)
    }
}

type MemberEntry<'a> = (
    &'a String,
    &'a BTreeSet<String>,
    Result<Vec<&'a str>, QueryParamsError>,
);

/// Entries whose key belongs to `member`, with their bracket segments.
fn select_member(
    raw: &RawQueryParams,
    member: QueryParamMember,
) -> impl Iterator<Item = MemberEntry<'_>> {
    raw.iter().filter_map(move |(key, values)| {
        let rest = strip_prefix_ignore_case(key, member.as_str())?;
        if !rest.is_empty() && !rest.starts_with('[') {
            // e.g. "filtered[...]" is not a filter parameter
            return None;
        }
        Some((key, values, bracket_segments(key, rest)))
    })
}

fn strip_prefix_ignore_case<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let head = key.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &key[prefix.len()..])
}

/// `[a][b][c]` -> `["a", "b", "c"]`
fn bracket_segments<'a>(key: &str, mut rest: &'a str) -> Result<Vec<&'a str>, QueryParamsError> {
    let malformed = || QueryParamsError::MalformedKey(key.to_string());
    let mut segments = Vec::new();

    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or_else(malformed)?;
        let end = inner.find(']').ok_or_else(malformed)?;
        let segment = &inner[..end];
        if segment.is_empty() || segment.contains('[') {
            return Err(malformed());
        }
        segments.push(segment);
        rest = &inner[end + 1..];
    }

    if segments.is_empty() {
        return Err(malformed());
    }
    Ok(segments)
}

fn split_resource_and_field(
    key: &str,
    segments: Vec<&str>,
) -> Result<(String, String), QueryParamsError> {
    match segments.split_first() {
        Some((resource, field)) if !field.is_empty() => {
            Ok((resource.to_string(), field.join(".")))
        }
        _ => Err(QueryParamsError::MalformedKey(key.to_string())),
    }
}

fn single_segment(key: &str, segments: Vec<&str>) -> Result<String, QueryParamsError> {
    match segments.as_slice() {
        [only] => Ok(only.to_string()),
        _ => Err(QueryParamsError::MalformedKey(key.to_string())),
    }
}

fn single_value<'a>(key: &str, values: &'a BTreeSet<String>) -> Result<&'a String, QueryParamsError> {
    let mut iter = values.iter();
    match (iter.next(), iter.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(QueryParamsError::MultipleValues(key.to_string())),
    }
}

fn parse_direction(key: &str, value: &str) -> Result<SortDirection, QueryParamsError> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortDirection::Asc),
        "desc" => Ok(SortDirection::Desc),
        _ => Err(QueryParamsError::InvalidSortDirection {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn split_values(values: &BTreeSet<String>) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, &[&str])]) -> RawQueryParams {
        entries
            .iter()
            .map(|(key, values)| {
                (
                    key.to_string(),
                    values.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect()
    }

    fn build(entries: &[(&str, &[&str])]) -> Result<QueryParams, QueryParamsError> {
        QueryParamsBuilder::new().build(&raw(entries))
    }

    #[test]
    fn select_member_skips_unrelated_keys() {
        let params = raw(&[
            ("FILTER[users][name]", &["John"]),
            ("random[users][name]", &["John"]),
            ("filtered[users]", &["x"]),
        ]);
        let selected: Vec<_> = select_member(&params, QueryParamMember::Filter)
            .map(|(key, _, _)| key.as_str())
            .collect();
        assert_eq!(selected, vec!["FILTER[users][name]"]);
    }

    #[test]
    fn filters() {
        let params = build(&[("FILTER[users][name]", &["John"])]).unwrap();
        let users = params.filters.get("users").unwrap();
        assert_eq!(
            users.get("name").unwrap(),
            &BTreeSet::from(["John".to_string()])
        );
    }

    #[test]
    fn nested_filter_field_is_dot_joined() {
        let params = build(&[("filter[users][address][city]", &["Oslo", "Bergen"])]).unwrap();
        let values = params.filters["users"].get("address.city").unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn sorting() {
        let params = build(&[("SORT[users][name]", &["ASC"])]).unwrap();
        assert_eq!(params.sorting["users"]["name"], SortDirection::Asc);

        let params = build(&[("sort[users][age]", &["desc"])]).unwrap();
        assert_eq!(params.sorting["users"]["age"], SortDirection::Desc);
    }

    #[test]
    fn sorting_rejects_bad_direction() {
        let err = build(&[("sort[users][name]", &["UP"])]).unwrap_err();
        assert_eq!(
            err,
            QueryParamsError::InvalidSortDirection {
                key: "sort[users][name]".into(),
                value: "UP".into(),
            }
        );
    }

    #[test]
    fn sorting_rejects_several_values() {
        let err = build(&[("sort[users][name]", &["asc", "desc"])]).unwrap_err();
        assert!(matches!(err, QueryParamsError::MultipleValues(_)));
    }

    #[test]
    fn grouping() {
        let params = build(&[("GROUP[users]", &["name"])]).unwrap();
        assert_eq!(
            params.grouping["users"].iter().next().map(String::as_str),
            Some("name")
        );
    }

    #[test]
    fn pagination() {
        let params = build(&[("PAGE[OFFSET]", &["0"]), ("PAGE[LIMIT]", &["10"])]).unwrap();
        assert_eq!(params.pagination[&PaginationKey::Offset], 0);
        assert_eq!(params.pagination[&PaginationKey::Limit], 10);
    }

    #[test]
    fn pagination_rejects_non_numeric() {
        let err = build(&[("page[limit]", &["ten"])]).unwrap_err();
        assert_eq!(
            err,
            QueryParamsError::InvalidPagination {
                key: PaginationKey::Limit,
                value: "ten".into(),
            }
        );
    }

    #[test]
    fn pagination_rejects_unknown_key() {
        let err = build(&[("page[size]", &["10"])]).unwrap_err();
        assert_eq!(
            err,
            QueryParamsError::UnknownPaginationKey("page[size]".into())
        );
    }

    #[test]
    fn included_fields_split_on_commas() {
        let params = build(&[("fields[users]", &["name,age"])]).unwrap();
        let fields: Vec<_> = params.included_fields["users"].iter().cloned().collect();
        assert_eq!(fields, vec!["age".to_string(), "name".to_string()]);
    }

    #[test]
    fn included_relations() {
        let params = build(&[("INCLUDE[special-users]", &["friends"])]).unwrap();
        assert!(params.included_relations["special-users"].contains("friends"));
    }

    #[test]
    fn malformed_keys() {
        for key in ["filter", "filter[users", "filter[]", "filter[users]x", "group[a][b]"] {
            let err = build(&[(key, &["v"])]).unwrap_err();
            assert_eq!(err, QueryParamsError::MalformedKey(key.into()), "{key}");
        }
    }

    #[test]
    fn filter_requires_a_field() {
        let err = build(&[("filter[users]", &["John"])]).unwrap_err();
        assert!(matches!(err, QueryParamsError::MalformedKey(_)));
    }

    #[test]
    fn empty_input_is_empty_params() {
        assert!(build(&[]).unwrap().is_empty());
    }
}
