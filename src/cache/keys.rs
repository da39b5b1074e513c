//! Key prefixes shared by every domain that writes into the one cache map.

use std::fmt;

/// Domain namespaces for cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    User,
    Guild,
    Quest,
    Raid,
    Nft,
    Leaderboard,
    Query,
}

impl Domain {
    /// Prefix (including the trailing `:`) for keys in this domain.
    pub fn prefix(self) -> &'static str {
        match self {
            Domain::User => "user:",
            Domain::Guild => "guild:",
            Domain::Quest => "quest:",
            Domain::Raid => "raid:",
            Domain::Nft => "nft:",
            Domain::Leaderboard => "leaderboard:",
            Domain::Query => "query:",
        }
    }

    /// Builds the cache key for `id` in this domain.
    pub fn key(self, id: &str) -> String {
        format!("{}{}", self.prefix(), id)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches(':'))
    }
}
