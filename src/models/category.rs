use serde::{Deserialize, Serialize};

use crate::{database_id::CategoryId, models::UserId};

/// A category for expenses and income, e.g., 'Groceries', 'Eating Out',
/// 'Wages'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserId,
    /// The name of the category.
    pub name: String,
}
