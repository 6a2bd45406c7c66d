use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A Confluence space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    #[serde(default)]
    pub id: Option<i64>,
    pub key: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Which spaces to list.
///
/// - `Global`: shared team spaces
/// - `Personal`: per-user spaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpaceType {
    #[default]
    Global,
    Personal,
}

impl SpaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Personal => "personal",
        }
    }
}

impl FromStr for SpaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::Global),
            "personal" => Ok(Self::Personal),
            _ => Err(format!("Invalid space type: {}", s)),
        }
    }
}

impl fmt::Display for SpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
