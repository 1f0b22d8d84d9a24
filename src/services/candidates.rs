use crate::{
    error::{AppError, AppResult},
    models::{Item, ItemFilter, ItemId, ItemKind, Scope, ViewerContext},
    services::library::ItemStore,
};

/// What to look for when building a candidate set
#[derive(Debug, Clone, Default)]
pub struct CandidateRequest {
    /// Reference item; the effective root is used when absent
    pub reference_id: Option<ItemId>,
    /// Reference item the caller already resolved; skips the store lookup
    pub resolved_reference: Option<Item>,
    /// Container to search under; the effective root is used when absent
    pub scope_id: Option<ItemId>,
    pub viewer: Option<ViewerContext>,
    pub exclude_artist_ids: Vec<ItemId>,
    pub include_types: Vec<ItemKind>,
}

/// The resolved reference item and everything eligible to be compared to it
#[derive(Debug, Clone)]
pub struct Candidates {
    pub reference: Item,
    pub items: Vec<Item>,
}

/// Parses a comma-delimited id list, skipping entries that are not valid ids
pub fn parse_id_list(raw: Option<&str>) -> Vec<ItemId> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<ItemId>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(entry = %entry, error = %e, "Skipping malformed id");
                None
            }
        })
        .collect()
}

/// Resolves the reference item, or the viewer's root when no id is given
pub async fn resolve_reference(
    store: &dyn ItemStore,
    reference_id: Option<ItemId>,
    viewer: Option<ViewerContext>,
) -> AppResult<Item> {
    match reference_id {
        Some(id) => store.resolve_item(id).await,
        None => store.root_folder(viewer.map(|v| v.user_id)).await,
    }
}

/// Resolves the search scope
///
/// An explicit scope must be a container. Without one the search covers the
/// viewer's root, or the whole library when there is no viewer.
pub async fn resolve_scope(
    store: &dyn ItemStore,
    scope_id: Option<ItemId>,
    viewer: Option<ViewerContext>,
) -> AppResult<Scope> {
    if let Some(scope_id) = scope_id {
        let container = store.resolve_item(scope_id).await?;
        if !container.kind.is_container() {
            return Err(AppError::InvalidInput(format!(
                "Item {} is a {} and cannot be used as a scope",
                container.id, container.kind
            )));
        }
        return Ok(Scope::Container(container.id));
    }

    Ok(match viewer {
        Some(viewer) => Scope::UserRoot(viewer.user_id),
        None => Scope::Global,
    })
}

/// Builds the full, unpaginated candidate set for a ranking call
pub async fn select_candidates(
    store: &dyn ItemStore,
    request: &CandidateRequest,
) -> AppResult<Candidates> {
    if request.include_types.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one item type must be included".to_string(),
        ));
    }

    let reference = match &request.resolved_reference {
        Some(item) => item.clone(),
        None => resolve_reference(store, request.reference_id, request.viewer).await?,
    };
    let scope = resolve_scope(store, request.scope_id, request.viewer).await?;

    let filter = ItemFilter {
        include_types: request.include_types.clone(),
        scope,
        exclude_artist_ids: request.exclude_artist_ids.clone(),
        recursive: true,
    };

    let mut items = store.list_items(&filter).await?;
    items.retain(|item| item.id != reference.id);

    tracing::debug!(
        reference_id = %reference.id,
        scope = ?filter.scope,
        include_types = ?filter.include_types,
        excluded_artists = filter.exclude_artist_ids.len(),
        candidates = items.len(),
        "Candidates selected"
    );

    Ok(Candidates { reference, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::library::MockItemStore;
    use uuid::Uuid;

    #[test]
    fn test_parse_id_list_skips_malformed_entries() {
        let a = ItemId::new();
        let b = ItemId::new();
        let raw = format!("{}, not-an-id,,{}", a, b.0.simple());

        assert_eq!(parse_id_list(Some(&raw)), vec![a, b]);
    }

    #[test]
    fn test_parse_id_list_empty() {
        assert!(parse_id_list(None).is_empty());
        assert!(parse_id_list(Some("")).is_empty());
        assert!(parse_id_list(Some(" , ,")).is_empty());
    }

    #[tokio::test]
    async fn test_missing_reference_is_not_found() {
        let mut store = MockItemStore::new();
        store
            .expect_resolve_item()
            .returning(|id| Err(AppError::NotFound(format!("Item {}", id))));
        store.expect_list_items().never();

        let request = CandidateRequest {
            reference_id: Some(ItemId::new()),
            include_types: vec![ItemKind::Movie],
            ..Default::default()
        };

        let result = select_candidates(&store, &request).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_no_reference_uses_user_root() {
        let user_id = Uuid::new_v4();
        let root = Item::new("Root", ItemKind::UserRootFolder);
        let root_clone = root.clone();

        let mut store = MockItemStore::new();
        store
            .expect_root_folder()
            .withf(move |user| *user == Some(user_id))
            .times(1)
            .returning(move |_| Ok(root_clone.clone()));
        store
            .expect_list_items()
            .withf(move |filter| filter.scope == Scope::UserRoot(user_id) && filter.recursive)
            .returning(|_| Ok(vec![Item::new("Movie", ItemKind::Movie)]));

        let request = CandidateRequest {
            viewer: Some(ViewerContext { user_id }),
            include_types: vec![ItemKind::Movie],
            ..Default::default()
        };

        let candidates = select_candidates(&store, &request).await.unwrap();
        assert_eq!(candidates.reference.id, root.id);
        assert_eq!(candidates.items.len(), 1);
    }

    #[tokio::test]
    async fn test_no_viewer_uses_global_scope() {
        let mut store = MockItemStore::new();
        store
            .expect_root_folder()
            .withf(|user| user.is_none())
            .returning(|_| Ok(Item::new("Root", ItemKind::AggregateFolder)));
        store
            .expect_list_items()
            .withf(|filter| filter.scope == Scope::Global)
            .returning(|_| Ok(vec![]));

        let request = CandidateRequest {
            include_types: vec![ItemKind::Movie],
            ..Default::default()
        };

        let candidates = select_candidates(&store, &request).await.unwrap();
        assert!(candidates.items.is_empty());
    }

    #[tokio::test]
    async fn test_scope_and_exclusions_passed_to_store() {
        let reference = Item::new("Album", ItemKind::MusicAlbum);
        let folder = Item::new("Music", ItemKind::CollectionFolder);
        let banned = ItemId::new();
        let (reference_id, folder_id) = (reference.id, folder.id);

        let mut store = MockItemStore::new();
        store.expect_resolve_item().returning(move |id| {
            if id == reference.id {
                Ok(reference.clone())
            } else if id == folder.id {
                Ok(folder.clone())
            } else {
                Err(AppError::NotFound(id.to_string()))
            }
        });
        store
            .expect_list_items()
            .withf(move |filter| {
                filter.scope == Scope::Container(folder_id)
                    && filter.exclude_artist_ids == vec![banned]
                    && filter.include_types == vec![ItemKind::MusicAlbum]
            })
            .returning(|_| Ok(vec![]));

        let request = CandidateRequest {
            reference_id: Some(reference_id),
            scope_id: Some(folder_id),
            exclude_artist_ids: vec![banned],
            include_types: vec![ItemKind::MusicAlbum],
            ..Default::default()
        };

        assert!(select_candidates(&store, &request).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_scope_is_not_found() {
        let reference = Item::new("Movie", ItemKind::Movie);
        let reference_id = reference.id;

        let mut store = MockItemStore::new();
        store.expect_resolve_item().returning(move |id| {
            if id == reference.id {
                Ok(reference.clone())
            } else {
                Err(AppError::NotFound(id.to_string()))
            }
        });
        store.expect_list_items().never();

        let request = CandidateRequest {
            reference_id: Some(reference_id),
            scope_id: Some(ItemId::new()),
            include_types: vec![ItemKind::Movie],
            ..Default::default()
        };

        let result = select_candidates(&store, &request).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_non_container_scope_rejected() {
        let movie = Item::new("Movie", ItemKind::Movie);
        let movie_id = movie.id;

        let mut store = MockItemStore::new();
        store
            .expect_resolve_item()
            .returning(move |_| Ok(movie.clone()));

        let result = resolve_scope(&store, Some(movie_id), None).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_reference_removed_from_candidates() {
        let reference = Item::new("Ref", ItemKind::Movie);
        let listed = vec![reference.clone(), Item::new("Other", ItemKind::Movie)];
        let reference_id = reference.id;

        let mut store = MockItemStore::new();
        store
            .expect_resolve_item()
            .returning(move |_| Ok(reference.clone()));
        store
            .expect_list_items()
            .returning(move |_| Ok(listed.clone()));

        let request = CandidateRequest {
            reference_id: Some(reference_id),
            include_types: vec![ItemKind::Movie],
            ..Default::default()
        };

        let candidates = select_candidates(&store, &request).await.unwrap();
        assert_eq!(candidates.items.len(), 1);
        assert!(candidates.items.iter().all(|i| i.id != reference_id));
    }

    #[tokio::test]
    async fn test_resolved_reference_not_fetched_again() {
        let reference = Item::new("Ref", ItemKind::Movie);
        let reference_id = reference.id;

        let mut store = MockItemStore::new();
        store.expect_resolve_item().never();
        store.expect_root_folder().never();
        store
            .expect_list_items()
            .times(1)
            .returning(|_| Ok(vec![Item::new("Other", ItemKind::Movie)]));

        let request = CandidateRequest {
            reference_id: Some(reference_id),
            resolved_reference: Some(reference),
            include_types: vec![ItemKind::Movie],
            ..Default::default()
        };

        let candidates = select_candidates(&store, &request).await.unwrap();
        assert_eq!(candidates.reference.id, reference_id);
        assert_eq!(candidates.items.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_include_types_rejected() {
        let store = MockItemStore::new();
        let result = select_candidates(&store, &CandidateRequest::default()).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
