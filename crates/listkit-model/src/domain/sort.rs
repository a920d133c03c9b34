use serde::{Deserialize, Serialize};

/// Direction a sort field is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Query-string token for this direction.
    pub fn as_query(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Parses a query-string token, case-insensitively.
    pub fn from_query(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    /// The opposite direction.
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sort order applied to a collection: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Same field with the direction flipped; column headers toggle with this.
    pub fn toggled(&self) -> Self {
        Self::new(self.field.clone(), self.direction.toggled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_query_tokens() {
        assert_eq!(SortDirection::Asc.as_query(), "ASC");
        assert_eq!(SortDirection::Desc.as_query(), "DESC");

        assert_eq!(SortDirection::from_query("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::from_query("ASC"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::from_query("sideways"), None);
    }

    #[test]
    fn toggled_flips_direction() {
        let sort = SortSpec::descending("createdAt");
        let toggled = sort.toggled();

        assert_eq!(toggled.field, "createdAt");
        assert_eq!(toggled.direction, SortDirection::Asc);
        assert_eq!(toggled.toggled(), sort);
    }

    #[test]
    fn serde_roundtrip() {
        let sort = SortSpec::ascending("name");
        let json = serde_json::to_string(&sort).unwrap();
        assert_eq!(json, r#"{"field":"name","direction":"ASC"}"#);

        let back: SortSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sort);
    }
}
