use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a Topic
    TopicId
);
numeric_id!(
    /// Unique identifier for a learning Entry
    EntryId
);
numeric_id!(
    /// Unique identifier for a learner
    UserId
);
numeric_id!(
    /// Unique identifier for a Project (SBU work)
    ProjectId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_id_display_and_debug() {
        let id = TopicId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "TopicId(42)");
    }

    #[test]
    fn entry_id_from_str_trims() {
        let id: EntryId = " 123 ".parse().unwrap();
        assert_eq!(id, EntryId::new(123));
    }

    #[test]
    fn from_str_invalid_names_kind() {
        let err = "not-a-number".parse::<UserId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse UserId from string");
    }

    #[test]
    fn ids_order_by_value() {
        let mut ids = vec![ProjectId::new(9), ProjectId::new(2), ProjectId::new(5)];
        ids.sort();
        assert_eq!(ids, vec![ProjectId::new(2), ProjectId::new(5), ProjectId::new(9)]);
    }
}
