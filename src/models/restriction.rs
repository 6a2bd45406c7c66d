use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Access restriction mode applied to a page.
///
/// - `None`: everybody can view and edit
/// - `EditOnly`: everybody can view, only the named user can edit
/// - `ViewOnly`: only the named user can view and edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionType {
    None,
    EditOnly,
    ViewOnly,
}

impl RestrictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::EditOnly => "edit_only",
            Self::ViewOnly => "view_only",
        }
    }

    /// Operations that get restricted to a single user.
    pub fn operations(&self) -> &'static [&'static str] {
        match self {
            Self::None => &[],
            Self::EditOnly => &["update"],
            Self::ViewOnly => &["read", "update"],
        }
    }
}

impl FromStr for RestrictionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "edit_only" => Ok(Self::EditOnly),
            "view_only" => Ok(Self::ViewOnly),
            _ => Err(format!("Invalid restriction type: {}", s)),
        }
    }
}

impl fmt::Display for RestrictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the experimental restriction API payload.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRestriction {
    pub operation: String,
    pub restrictions: RestrictionSubjects,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestrictionSubjects {
    pub user: Vec<RestrictedUser>,
    pub group: Vec<RestrictedGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestrictedUser {
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestrictedGroup {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl OperationRestriction {
    /// Restrict `operation` to a single known user.
    pub fn for_user(operation: &str, username: &str) -> Self {
        Self {
            operation: operation.to_string(),
            restrictions: RestrictionSubjects {
                user: vec![RestrictedUser {
                    kind: "known".to_string(),
                    username: username.to_string(),
                }],
                group: Vec::new(),
            },
        }
    }
}
