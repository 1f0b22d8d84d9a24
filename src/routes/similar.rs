use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Item, ItemDto, ItemId, ItemKind, QueryResult, ViewerContext},
    routes::AppState,
    services::{
        candidates::{parse_id_list, CandidateRequest},
        get_similar_items, SimilarItemsRequest,
    },
};

const MOVIE_TYPES: &[ItemKind] = &[ItemKind::Movie, ItemKind::Trailer];
const SHOW_TYPES: &[ItemKind] = &[ItemKind::Series];
const ALBUM_TYPES: &[ItemKind] = &[ItemKind::MusicAlbum];
const ARTIST_TYPES: &[ItemKind] = &[ItemKind::MusicArtist];
const TRAILER_TYPES: &[ItemKind] = &[ItemKind::Trailer];

#[derive(Debug, Default, Deserialize)]
pub struct SimilarItemsQuery {
    /// Acting user; a nil id means no user
    pub user_id: Option<Uuid>,
    /// Container to confine the search to
    pub parent_id: Option<ItemId>,
    /// Comma-delimited artist ids whose items are left out
    pub exclude_artist_ids: Option<String>,
    pub limit: Option<usize>,
    /// Comma-delimited item types (generic endpoints only)
    pub include_item_types: Option<String>,
}

/// Parses a comma-delimited list of item type names
pub fn parse_item_types(raw: &str) -> AppResult<Vec<ItemKind>> {
    let mut kinds = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let kind = entry.parse::<ItemKind>().map_err(AppError::InvalidInput)?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

async fn run_similar(
    state: &AppState,
    request_id: RequestId,
    reference_id: Option<ItemId>,
    resolved_reference: Option<Item>,
    include_types: Vec<ItemKind>,
    params: SimilarItemsQuery,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    let exclude_artist_ids = parse_id_list(params.exclude_artist_ids.as_deref());

    tracing::info!(
        request_id = %request_id,
        reference_id = ?reference_id,
        include_types = ?include_types,
        excluded_artists = exclude_artist_ids.len(),
        limit = ?params.limit,
        "Processing similar items request"
    );

    let request = SimilarItemsRequest {
        candidates: CandidateRequest {
            reference_id,
            resolved_reference,
            scope_id: params.parent_id,
            viewer: ViewerContext::from_user_id(params.user_id),
            exclude_artist_ids,
            include_types,
        },
        limit: params.limit,
    };

    let result = get_similar_items(
        state.store.as_ref(),
        state.people.as_ref(),
        state.projector.as_ref(),
        request,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        returned = result.items.len(),
        total = result.total_record_count,
        "Similar items request completed"
    );

    Ok(Json(result))
}

/// Items similar to the effective root folder
pub async fn similar_to_root(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SimilarItemsQuery>,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    let include_types = parse_item_types(params.include_item_types.as_deref().unwrap_or(""))?;
    if include_types.is_empty() {
        return Err(AppError::InvalidInput(
            "include_item_types is required".to_string(),
        ));
    }

    run_similar(&state, request_id, None, None, include_types, params).await
}

/// Items similar to `id`, of the requested types or of the item's own type
pub async fn similar_items(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<ItemId>,
    Query(params): Query<SimilarItemsQuery>,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    let mut include_types = parse_item_types(params.include_item_types.as_deref().unwrap_or(""))?;
    let mut resolved_reference = None;
    if include_types.is_empty() {
        let reference = state.store.resolve_item(id).await?;
        include_types.push(reference.kind);
        resolved_reference = Some(reference);
    }

    run_similar(&state, request_id, Some(id), resolved_reference, include_types, params).await
}

pub async fn similar_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<ItemId>,
    Query(params): Query<SimilarItemsQuery>,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    run_similar(&state, request_id, Some(id), None, MOVIE_TYPES.to_vec(), params).await
}

pub async fn similar_shows(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<ItemId>,
    Query(params): Query<SimilarItemsQuery>,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    run_similar(&state, request_id, Some(id), None, SHOW_TYPES.to_vec(), params).await
}

pub async fn similar_albums(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<ItemId>,
    Query(params): Query<SimilarItemsQuery>,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    run_similar(&state, request_id, Some(id), None, ALBUM_TYPES.to_vec(), params).await
}

pub async fn similar_artists(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<ItemId>,
    Query(params): Query<SimilarItemsQuery>,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    run_similar(&state, request_id, Some(id), None, ARTIST_TYPES.to_vec(), params).await
}

pub async fn similar_trailers(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<ItemId>,
    Query(params): Query<SimilarItemsQuery>,
) -> AppResult<Json<QueryResult<ItemDto>>> {
    run_similar(&state, request_id, Some(id), None, TRAILER_TYPES.to_vec(), params).await
}
