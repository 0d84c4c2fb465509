use crate::types::join_key::{COL_DISTRICT, COL_STATE, COL_TEHSIL};
use std::fmt;

/// One level of the administrative hierarchy narrowed by the filter cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdminLevel {
    State,
    District,
    Tehsil,
}

impl AdminLevel {
    /// Column holding this level's names.
    pub fn column(&self) -> &'static str {
        match self {
            AdminLevel::State => COL_STATE,
            AdminLevel::District => COL_DISTRICT,
            AdminLevel::Tehsil => COL_TEHSIL,
        }
    }

    /// The level below this one, or `None` for tehsils.
    pub fn next(&self) -> Option<AdminLevel> {
        match self {
            AdminLevel::State => Some(AdminLevel::District),
            AdminLevel::District => Some(AdminLevel::Tehsil),
            AdminLevel::Tehsil => None,
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}
