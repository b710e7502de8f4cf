use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Seeded reference row shared by account and transaction categories.
/// Categories are read-only lookup data; nothing in the service mutates them.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Category information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Unique category identifier
    pub id: i32,
    /// Category name
    #[schema(example = "Food & Dining")]
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}
