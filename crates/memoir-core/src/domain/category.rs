use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of topics a post can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Mobile,
    Devops,
    Personal,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Frontend,
        Category::Backend,
        Category::Mobile,
        Category::Devops,
        Category::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Mobile => "mobile",
            Category::Devops => "devops",
            Category::Personal => "personal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a category label is not one of [`Category::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid category '{0}', expected one of: frontend, backend, mobile, devops, personal")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Labels are matched case-insensitively, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("FrontEnd".parse::<Category>(), Ok(Category::Frontend));
        assert_eq!(" devops ".parse::<Category>(), Ok(Category::Devops));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "cooking".parse::<Category>().unwrap_err();
        assert_eq!(err.0, "cooking");
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Personal).unwrap();
        assert_eq!(json, "\"personal\"");
    }
}
