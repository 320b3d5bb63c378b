use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Type discriminant of an in-memory object record.
///
/// `Unknown` is the state of a record created from a bare digest before
/// anything has told us what the digest names. A record leaves `Unknown` at
/// most once; the numeric ids match the on-disk type codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectType {
    #[default]
    Unknown = 0,
    Commit = 1,
    Tree = 2,
    Blob = 3,
    Tag = 4,
}

impl ObjectType {
    /// The four concrete types, in id order.
    pub const CONCRETE: [ObjectType; 4] = [Self::Commit, Self::Tree, Self::Blob, Self::Tag];

    /// Canonical lowercase name. `Unknown` has none.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Commit => Some("commit"),
            Self::Tree => Some("tree"),
            Self::Blob => Some("blob"),
            Self::Tag => Some("tag"),
        }
    }

    /// Parse a canonical type name. Only the four concrete names match.
    pub fn from_name(name: &str) -> Result<Self, TypeError> {
        Self::CONCRETE
            .into_iter()
            .find(|t| t.name() == Some(name))
            .ok_or_else(|| TypeError::UnknownTypeName(name.to_string()))
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Unknown),
            1 => Some(Self::Commit),
            2 => Some(Self::Tree),
            3 => Some(Self::Blob),
            4 => Some(Self::Tag),
            _ => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }
}

impl FromStr for ObjectType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unknown"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for t in ObjectType::CONCRETE {
            assert_eq!(ObjectType::from_name(t.name().unwrap()), Ok(t));
        }
    }

    #[test]
    fn unknown_has_no_name_and_cannot_be_parsed() {
        assert_eq!(ObjectType::Unknown.name(), None);
        assert!(ObjectType::from_name("unknown").is_err());
        assert!(ObjectType::from_name("").is_err());
    }

    #[test]
    fn prefixes_are_not_names() {
        assert_eq!(
            "com".parse::<ObjectType>(),
            Err(TypeError::UnknownTypeName("com".into()))
        );
        assert!("blobs".parse::<ObjectType>().is_err());
    }

    #[test]
    fn ids_match_type_codes() {
        assert_eq!(ObjectType::Commit.id(), 1);
        assert_eq!(ObjectType::Tag.id(), 4);
        assert_eq!(ObjectType::from_id(2), Some(ObjectType::Tree));
        assert_eq!(ObjectType::from_id(5), None);
    }

    #[test]
    fn default_is_unknown() {
        assert!(ObjectType::default().is_unknown());
        assert_eq!(ObjectType::Blob.to_string(), "blob");
    }
}
