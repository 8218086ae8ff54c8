//! String attribute adapter
//!
//! Hosts that speak DOM attributes hand raw strings to
//! [`InfiniteScrollList::attribute_changed`](crate::list::InfiniteScrollList::attribute_changed).
//! This is the only place those strings are interpreted.

/// Observed widget attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    OnEndReachedThreshold,
    OnStartReachedThreshold,
    HasNextPage,
    HasPreviousPage,
    EnableRefresh,
    RefreshThreshold,
    IsRefreshing,
}

impl Attribute {
    /// Every observed attribute
    pub const ALL: [Attribute; 7] = [
        Attribute::OnEndReachedThreshold,
        Attribute::OnStartReachedThreshold,
        Attribute::HasNextPage,
        Attribute::HasPreviousPage,
        Attribute::EnableRefresh,
        Attribute::RefreshThreshold,
        Attribute::IsRefreshing,
    ];

    /// Attribute name as it appears on the element
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::OnEndReachedThreshold => "on-end-reached-threshold",
            Attribute::OnStartReachedThreshold => "on-start-reached-threshold",
            Attribute::HasNextPage => "has-next-page",
            Attribute::HasPreviousPage => "has-previous-page",
            Attribute::EnableRefresh => "enable-refresh",
            Attribute::RefreshThreshold => "refresh-threshold",
            Attribute::IsRefreshing => "is-refreshing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    /// Names of every observed attribute
    pub fn observed() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(|attr| attr.name())
    }
}

/// Boolean-ish attribute: absent or `"false"` is false, anything else is true
pub fn parse_bool_attr(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v != "false")
}

/// Numeric attribute with fallback.
///
/// Absent, empty, unparsable, NaN and zero values all fall back to `default`.
pub fn parse_number_attr(value: Option<&str>, default: f32) -> f32 {
    let Some(raw) = value else {
        return default;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default;
    }
    match trimmed.parse::<f32>() {
        Ok(n) if n != 0.0 && !n.is_nan() => n,
        _ => default,
    }
}
