//! Identifier newtypes used as keys throughout the pipeline.

macro_rules! define_int_id {
    (
        $(#[$outer:meta])*
        struct $t:tt
    ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $t(u64);

        impl $t {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn to_u64(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $t {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $t {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_int_id!(
    /// Canonical integer form of a user id; recipient dedup happens on
    /// this type.
    struct UserId
);

define_int_id!(
    struct PostId
);

define_int_id!(
    struct TopicId
);

/// Normalized identifier derived from a mention token by the platform's
/// slugification rule. Slugs are the resolution and cache key; raw
/// token strings never reach the stores.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slug(String);

impl Slug {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A group's display name as the platform stores it, distinct from the
/// slug it resolves from.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
