use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Item, ItemFilter, ItemId, ItemKind, PersonAssociation, Scope, UserItemData},
    services::library::{ItemStore, PeopleIndex},
};

/// Library held entirely in memory
///
/// Serves both the item and people contracts. Items are listed in insertion
/// order, which makes tie ordering in rankings predictable.
#[derive(Clone)]
pub struct InMemoryLibrary {
    inner: Arc<RwLock<LibraryInner>>,
}

struct LibraryInner {
    items: Vec<Item>,
    positions: HashMap<ItemId, usize>,
    people: Vec<PersonAssociation>,
    root_id: ItemId,
    user_roots: HashMap<Uuid, ItemId>,
    user_data: HashMap<(Uuid, ItemId), UserItemData>,
}

impl LibraryInner {
    fn get(&self, id: ItemId) -> Option<&Item> {
        self.positions.get(&id).map(|&pos| &self.items[pos])
    }

    /// Whether `item` sits somewhere below `container`
    fn is_descendant(&self, item: &Item, container: ItemId, recursive: bool) -> bool {
        let mut parent = item.parent_id;
        // bounded walk so a corrupt parent cycle cannot spin forever
        for _ in 0..self.items.len() {
            match parent {
                Some(id) if id == container => return true,
                Some(id) if recursive => parent = self.get(id).and_then(|p| p.parent_id),
                _ => return false,
            }
        }
        false
    }

    fn scope_root(&self, scope: Scope) -> AppResult<Option<ItemId>> {
        match scope {
            Scope::Container(id) => Ok(Some(id)),
            Scope::UserRoot(user_id) => self
                .user_roots
                .get(&user_id)
                .copied()
                .map(Some)
                .ok_or_else(|| AppError::NotFound(format!("User {}", user_id))),
            Scope::Global => Ok(None),
        }
    }
}

impl Default for InMemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLibrary {
    /// Creates an empty library with a global root folder
    pub fn new() -> Self {
        let root = Item::new("Root", ItemKind::AggregateFolder);
        let root_id = root.id;
        let mut positions = HashMap::new();
        positions.insert(root_id, 0);

        Self {
            inner: Arc::new(RwLock::new(LibraryInner {
                items: vec![root],
                positions,
                people: Vec::new(),
                root_id,
                user_roots: HashMap::new(),
                user_data: HashMap::new(),
            })),
        }
    }

    /// Id of the global root folder
    pub async fn root_id(&self) -> ItemId {
        self.inner.read().await.root_id
    }

    /// Adds or replaces an item
    ///
    /// Items without a parent are attached to the global root.
    pub async fn add_item(&self, mut item: Item) -> ItemId {
        let mut inner = self.inner.write().await;
        if item.parent_id.is_none() && item.id != inner.root_id {
            item.parent_id = Some(inner.root_id);
        }

        let id = item.id;
        match inner.positions.get(&id).copied() {
            Some(pos) => inner.items[pos] = item,
            None => {
                let pos = inner.items.len();
                inner.items.push(item);
                inner.positions.insert(id, pos);
            }
        }
        id
    }

    /// Credits a person on an item
    pub async fn add_person(&self, person: PersonAssociation) {
        self.inner.write().await.people.push(person);
    }

    /// Registers a user whose library is everything below `root_folder_id`
    pub async fn add_user(&self, user_id: Uuid, root_folder_id: ItemId) {
        self.inner
            .write()
            .await
            .user_roots
            .insert(user_id, root_folder_id);
    }

    pub async fn set_user_data(&self, user_id: Uuid, item_id: ItemId, data: UserItemData) {
        self.inner
            .write()
            .await
            .user_data
            .insert((user_id, item_id), data);
    }
}

#[async_trait::async_trait]
impl ItemStore for InMemoryLibrary {
    async fn resolve_item(&self, id: ItemId) -> AppResult<Item> {
        self.inner
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Item {}", id)))
    }

    async fn root_folder(&self, user_id: Option<Uuid>) -> AppResult<Item> {
        let inner = self.inner.read().await;
        let root_id = match user_id {
            Some(user_id) => inner
                .user_roots
                .get(&user_id)
                .copied()
                .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?,
            None => inner.root_id,
        };

        inner
            .get(root_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Root folder {}", root_id)))
    }

    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<Item>> {
        let inner = self.inner.read().await;
        let scope_root = inner.scope_root(filter.scope)?;

        Ok(inner
            .items
            .iter()
            .filter(|item| filter.accepts(item))
            .filter(|item| match scope_root {
                Some(container) => inner.is_descendant(item, container, filter.recursive),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn user_data(
        &self,
        user_id: Uuid,
        item_ids: &[ItemId],
    ) -> AppResult<HashMap<ItemId, UserItemData>> {
        let inner = self.inner.read().await;
        Ok(item_ids
            .iter()
            .filter_map(|id| {
                inner
                    .user_data
                    .get(&(user_id, *id))
                    .map(|data| (*id, data.clone()))
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl PeopleIndex for InMemoryLibrary {
    async fn people_of(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .people
            .iter()
            .filter(|p| p.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn people_appearing_in(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>> {
        let inner = self.inner.read().await;

        let names: HashSet<String> = inner
            .people
            .iter()
            .filter(|p| p.item_id == item_id)
            .map(|p| p.name.to_lowercase())
            .collect();

        let linked_items: HashSet<ItemId> = inner
            .people
            .iter()
            .filter(|p| names.contains(&p.name.to_lowercase()))
            .map(|p| p.item_id)
            .collect();

        Ok(inner
            .people
            .iter()
            .filter(|p| linked_items.contains(&p.item_id))
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
