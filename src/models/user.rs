//! Defines the owner identifier that every row is scoped by.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The ID of the user that owns a row.
///
/// Authentication lives outside this crate; the ID is an opaque scope handed
/// in by the caller and matched against the `user_id` column on every query,
/// so one user can never read or mutate another user's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Create a user ID from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer for use in database queries.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
