use core::str::FromStr;

use securefile_core::DomainError;

/// Access requested against a group (`"read"` / `"write"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GroupAction {
    Read,
    Write,
}

impl GroupAction {
    /// Prefix a `groups` claim must carry after the group name.
    ///
    /// `:r` is a prefix of both `:ro` and `:rw`, so any membership level
    /// satisfies a read check; only `:rw` satisfies write.
    pub fn membership_suffix(self) -> &'static str {
        match self {
            GroupAction::Read => ":r",
            GroupAction::Write => ":rw",
        }
    }
}

impl FromStr for GroupAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(GroupAction::Read),
            "write" => Ok(GroupAction::Write),
            other => Err(DomainError::validation(format!(
                "group action must be 'read' or 'write', got '{other}'"
            ))),
        }
    }
}

/// Membership level encoded after the `:` of a group claim.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// `ro`
    ReadOnly,
    /// `rw`
    ReadWrite,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::ReadOnly => "ro",
            AccessLevel::ReadWrite => "rw",
        }
    }
}

/// A `<group>:<ro|rw>` membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupMembership {
    group: String,
    level: AccessLevel,
}

impl GroupMembership {
    pub fn new(group: impl Into<String>, level: AccessLevel) -> Result<Self, DomainError> {
        let group = group.into();
        if group.is_empty() {
            return Err(DomainError::validation("group name must not be empty"));
        }
        if group.contains(':') {
            return Err(DomainError::validation(format!(
                "group name '{group}' must not contain ':'"
            )));
        }
        Ok(Self { group, level })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn level(&self) -> AccessLevel {
        self.level
    }
}

impl core::fmt::Display for GroupMembership {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.group, self.level.as_str())
    }
}

impl FromStr for GroupMembership {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, level) = s
            .split_once(':')
            .ok_or_else(|| DomainError::validation(format!("'{s}' is not a group:level pair")))?;
        let level = match level {
            "ro" => AccessLevel::ReadOnly,
            "rw" => AccessLevel::ReadWrite,
            other => {
                return Err(DomainError::validation(format!(
                    "unknown membership level '{other}'"
                )));
            }
        };
        Self::new(group, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_memberships() {
        let m: GroupMembership = "team:rw".parse().unwrap();
        assert_eq!(m.group(), "team");
        assert_eq!(m.level(), AccessLevel::ReadWrite);
        assert_eq!(m.to_string(), "team:rw");
    }

    #[test]
    fn rejects_malformed_memberships() {
        for bad in ["admin", "team:", ":rw", "team:rx", "a:b:rw", ""] {
            assert!(bad.parse::<GroupMembership>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn actions_parse_from_route_strings() {
        assert_eq!("read".parse::<GroupAction>().unwrap(), GroupAction::Read);
        assert_eq!("write".parse::<GroupAction>().unwrap(), GroupAction::Write);
        assert!("delete".parse::<GroupAction>().is_err());
    }
}
