//! Database entity models for the SeaORM-backed client storage.
//!
//! The only entity is `client_storage`, a key/value table holding the
//! persisted bearer token (and any other client-side value a host wants to
//! keep across restarts).

/// Key/value entity model used by [`SeaOrmStorage`](crate::SeaOrmStorage).
pub mod client_storage;
