//! Key/value entity model for Sea-ORM database interaction.
//!
//! Maps to the `client_storage` table created by the crate's migrator.

use sea_orm::entity::prelude::*;

/// One stored value.
///
/// # Database Schema
///
/// | Column     | Type               | Description                     |
/// |------------|--------------------|---------------------------------|
/// | key        | TEXT (Primary Key) | Storage key, e.g. `token`       |
/// | value      | TEXT               | Stored value                    |
/// | updated_at | TIMESTAMPTZ        | Time of the last write          |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "client_storage")]
pub struct Model {
    /// Storage key, unique per value.
    ///
    /// The client only writes [`TOKEN_KEY`](crate::TOKEN_KEY); the column is
    /// free text so that other host state can share the table.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub key: String,

    /// The stored value as plain text. For the token this is the raw JWT,
    /// exactly as the backend issued it.
    #[sea_orm(column_type = "Text")]
    pub value: String,

    /// When the value was last written.
    ///
    /// Informational only: token expiry is read from the JWT claims, never
    /// from this column.
    pub updated_at: DateTimeWithTimeZone,
}

/// This entity has no relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// Default active model behaviour.
impl ActiveModelBehavior for ActiveModel {}
