use std::time::Instant;

use crate::{
    error::AppResult,
    models::{ItemDto, QueryResult},
    services::{
        candidates::{select_candidates, CandidateRequest},
        library::{ItemStore, PeopleIndex},
        people::lookup_people,
        projection::ResultProjector,
        ranking::rank_candidates,
        scoring::{similarity_score, ScoreFn},
    },
};

/// A similar-items request as handed over by the HTTP layer
#[derive(Debug, Clone, Default)]
pub struct SimilarItemsRequest {
    pub candidates: CandidateRequest,
    pub limit: Option<usize>,
}

/// Finds the items most similar to a reference item
///
/// Runs the whole pipeline for one request:
/// 1. Resolve the reference and select candidates from the store
/// 2. Fetch people for the reference and every item sharing one of them
/// 3. Score, filter, order and cap the candidates
/// 4. Project the capped list once
///
/// `total_record_count` is the number of matches before the cap.
pub async fn get_similar_items(
    store: &dyn ItemStore,
    people: &dyn PeopleIndex,
    projector: &dyn ResultProjector,
    request: SimilarItemsRequest,
) -> AppResult<QueryResult<ItemDto>> {
    get_similar_items_with(store, people, projector, request, similarity_score).await
}

/// Same as [`get_similar_items`] with a caller-chosen scorer
pub async fn get_similar_items_with(
    store: &dyn ItemStore,
    people: &dyn PeopleIndex,
    projector: &dyn ResultProjector,
    request: SimilarItemsRequest,
    score_fn: ScoreFn,
) -> AppResult<QueryResult<ItemDto>> {
    let start = Instant::now();

    let candidates = select_candidates(store, &request.candidates).await?;
    let reference_people = lookup_people(people, candidates.reference.id).await?;

    let candidate_count = candidates.items.len();
    let ranked = rank_candidates(
        &candidates.reference,
        &reference_people,
        candidates.items,
        request.limit,
        score_fn,
    );
    let total_record_count = ranked.total_matches;

    let items = projector
        .project(ranked.into_items(), request.candidates.viewer)
        .await?;

    tracing::info!(
        reference_id = %candidates.reference.id,
        candidates = candidate_count,
        total_matches = total_record_count,
        returned = items.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Similar items ranked"
    );

    Ok(QueryResult {
        items,
        total_record_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Item, ItemId, ItemKind, PersonAssociation, PersonKind, ViewerContext};
    use crate::services::library::{MockItemStore, MockPeopleIndex};
    use crate::services::projection::MockResultProjector;

    fn store_with(reference: Item, pool: Vec<Item>) -> MockItemStore {
        let mut store = MockItemStore::new();
        store
            .expect_resolve_item()
            .returning(move |_| Ok(reference.clone()));
        store
            .expect_list_items()
            .returning(move |_| Ok(pool.clone()));
        store
    }

    fn people_with(
        credited: Vec<PersonAssociation>,
        appearing: Vec<PersonAssociation>,
    ) -> MockPeopleIndex {
        let mut index = MockPeopleIndex::new();
        index
            .expect_people_of()
            .returning(move |_| Ok(credited.clone()));
        index
            .expect_people_appearing_in()
            .returning(move |_| Ok(appearing.clone()));
        index.expect_name().return_const("mock");
        index
    }

    fn passthrough_projector() -> MockResultProjector {
        let mut projector = MockResultProjector::new();
        projector
            .expect_project()
            .times(1)
            .returning(|items, _| Ok(items.iter().map(ItemDto::from).collect()));
        projector
    }

    fn request(reference_id: ItemId, limit: Option<usize>) -> SimilarItemsRequest {
        SimilarItemsRequest {
            candidates: CandidateRequest {
                reference_id: Some(reference_id),
                include_types: vec![ItemKind::Movie],
                ..Default::default()
            },
            limit,
        }
    }

    #[tokio::test]
    async fn test_limit_and_total() {
        let reference = Item::new("Ref", ItemKind::Movie).with_genres(&["Drama"]);
        let reference_id = reference.id;
        let pool: Vec<Item> = (0..5)
            .map(|i| Item::new(format!("M{}", i), ItemKind::Movie).with_genres(&["Drama"]))
            .chain(std::iter::once(Item::new("Unrelated", ItemKind::Movie)))
            .collect();

        let store = store_with(reference, pool);
        let people = people_with(vec![], vec![]);
        let projector = passthrough_projector();

        let result = get_similar_items(&store, &people, &projector, request(reference_id, Some(2)))
            .await
            .unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.total_record_count, 5);
    }

    #[tokio::test]
    async fn test_people_raise_rank() {
        let reference = Item::new("Ref", ItemKind::Movie).with_genres(&["Drama"]);
        let reference_id = reference.id;
        let plain = Item::new("Plain", ItemKind::Movie).with_genres(&["Drama"]);
        let directed = Item::new("Directed", ItemKind::Movie).with_genres(&["Drama"]);

        let credited = vec![PersonAssociation::new(
            "Jane Doe",
            PersonKind::Director,
            None,
            reference_id,
        )];
        let appearing = vec![
            PersonAssociation::new("Jane Doe", PersonKind::Director, None, reference_id),
            PersonAssociation::new("jane doe", PersonKind::Director, None, directed.id),
        ];

        let store = store_with(reference, vec![plain, directed]);
        let people = people_with(credited, appearing);
        let projector = passthrough_projector();

        let result = get_similar_items(&store, &people, &projector, request(reference_id, None))
            .await
            .unwrap();

        let names: Vec<&str> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Directed", "Plain"]);
        assert_eq!(result.total_record_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_reference_stops_before_scoring() {
        let mut store = MockItemStore::new();
        store
            .expect_resolve_item()
            .returning(|id| Err(AppError::NotFound(format!("Item {}", id))));
        store.expect_list_items().never();

        let mut people = MockPeopleIndex::new();
        people.expect_people_of().never();
        people.expect_people_appearing_in().never();

        let mut projector = MockResultProjector::new();
        projector.expect_project().never();

        let result =
            get_similar_items(&store, &people, &projector, request(ItemId::new(), None)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let reference = Item::new("Ref", ItemKind::Movie);
        let reference_id = reference.id;

        let mut store = MockItemStore::new();
        store
            .expect_resolve_item()
            .returning(move |_| Ok(reference.clone()));
        store
            .expect_list_items()
            .returning(|_| Err(AppError::Internal("store offline".to_string())));

        let people = MockPeopleIndex::new();
        let projector = MockResultProjector::new();

        let result =
            get_similar_items(&store, &people, &projector, request(reference_id, None)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_viewer_forwarded_to_projector() {
        let reference = Item::new("Ref", ItemKind::Movie).with_genres(&["Drama"]);
        let reference_id = reference.id;
        let viewer = ViewerContext {
            user_id: uuid::Uuid::new_v4(),
        };

        let mut store = store_with(
            reference,
            vec![Item::new("Match", ItemKind::Movie).with_genres(&["Drama"])],
        );
        store.expect_root_folder().never();
        let people = people_with(vec![], vec![]);

        let mut projector = MockResultProjector::new();
        projector
            .expect_project()
            .withf(move |items, v| items.len() == 1 && *v == Some(viewer))
            .times(1)
            .returning(|items, _| Ok(items.iter().map(ItemDto::from).collect()));

        let mut req = request(reference_id, None);
        req.candidates.viewer = Some(viewer);

        let result = get_similar_items(&store, &people, &projector, req)
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_scorer_is_used() {
        fn nothing_matches(
            _: &Item,
            _: &[PersonAssociation],
            _: &crate::services::people::CreditIndex,
            _: &Item,
        ) -> u32 {
            0
        }

        let reference = Item::new("Ref", ItemKind::Movie).with_genres(&["Drama"]);
        let reference_id = reference.id;
        let store = store_with(
            reference,
            vec![Item::new("Match", ItemKind::Movie).with_genres(&["Drama"])],
        );
        let people = people_with(vec![], vec![]);
        let projector = passthrough_projector();

        let result = get_similar_items_with(
            &store,
            &people,
            &projector,
            request(reference_id, None),
            nothing_matches,
        )
        .await
        .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.total_record_count, 0);
    }
}
