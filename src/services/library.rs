//! Read-only contracts onto the media library
//!
//! The similarity engine never owns library data. Items, their people and any
//! per-user state come from implementations of these traits, injected as
//! `Arc<dyn …>` so the Postgres store, the in-memory library and test mocks
//! are interchangeable.
use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Item, ItemFilter, ItemId, PersonAssociation, UserItemData},
};

/// Source of library items
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// Resolve a single item by id
    ///
    /// Fails with `NotFound` when the id does not resolve.
    async fn resolve_item(&self, id: ItemId) -> AppResult<Item>;

    /// The effective root for a user, or the global root when `user_id` is `None`
    ///
    /// Fails with `NotFound` for an unknown user.
    async fn root_folder(&self, user_id: Option<Uuid>) -> AppResult<Item>;

    /// List every item matching `filter`, in a stable store-defined order
    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<Item>>;

    /// Per-user state for the given items; items without state are omitted
    async fn user_data(
        &self,
        user_id: Uuid,
        item_ids: &[ItemId],
    ) -> AppResult<HashMap<ItemId, UserItemData>>;
}

/// Index of people credited on items
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PeopleIndex: Send + Sync {
    /// People credited on `item_id`
    async fn people_of(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>>;

    /// Every association on every item that credits at least one person who
    /// is also credited on `item_id`
    async fn people_appearing_in(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>>;

    /// Index name for logging
    fn name(&self) -> &'static str;
}
