use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Item, ItemId, ItemKind};

/// Scope that bounds a candidate search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Descendants of a container item
    Container(ItemId),
    /// Everything visible from a user's root folder
    UserRoot(Uuid),
    /// The whole library
    Global,
}

/// Filter handed to the item store when listing candidates
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFilter {
    pub include_types: Vec<ItemKind>,
    pub scope: Scope,
    pub exclude_artist_ids: Vec<ItemId>,
    pub recursive: bool,
}

impl ItemFilter {
    /// Whether `item` passes the type and artist constraints (scope is the
    /// store's concern)
    pub fn accepts(&self, item: &Item) -> bool {
        self.include_types.contains(&item.kind) && !item.has_any_artist(&self.exclude_artist_ids)
    }
}

/// The user a ranking call is made on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerContext {
    pub user_id: Uuid,
}

impl ViewerContext {
    /// Returns `None` for an absent or nil user id
    pub fn from_user_id(user_id: Option<Uuid>) -> Option<Self> {
        user_id
            .filter(|id| !id.is_nil())
            .map(|user_id| Self { user_id })
    }
}

/// Per-user state attached to an output record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserItemData {
    pub played: bool,
    pub is_favorite: bool,
    pub play_count: u32,
}

/// Output record for a ranked item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDto {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub production_year: Option<i32>,
    pub official_rating: Option<String>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserItemData>,
}

impl From<&Item> for ItemDto {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            kind: item.kind,
            production_year: item.production_year,
            official_rating: item.official_rating.clone(),
            genres: item.genres.clone(),
            studios: item.studios.clone(),
            user_data: None,
        }
    }
}

/// A page of results plus the uncapped match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total_record_count: usize,
}
