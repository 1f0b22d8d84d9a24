use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Item, ItemDto, ItemId, ViewerContext},
    services::library::ItemStore,
};

/// Maps ranked items to output records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ResultProjector: Send + Sync {
    /// Projects `items` in order, decorated with the viewer's state when present
    async fn project(
        &self,
        items: Vec<Item>,
        viewer: Option<ViewerContext>,
    ) -> AppResult<Vec<ItemDto>>;
}

/// Projector that attaches per-user state read from the item store
#[derive(Clone)]
pub struct DtoProjector {
    store: Arc<dyn ItemStore>,
}

impl DtoProjector {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ResultProjector for DtoProjector {
    async fn project(
        &self,
        items: Vec<Item>,
        viewer: Option<ViewerContext>,
    ) -> AppResult<Vec<ItemDto>> {
        let mut dtos: Vec<ItemDto> = items.iter().map(ItemDto::from).collect();

        let Some(viewer) = viewer else {
            return Ok(dtos);
        };

        if dtos.is_empty() {
            return Ok(dtos);
        }

        let ids: Vec<ItemId> = items.iter().map(|item| item.id).collect();
        let mut user_data = self.store.user_data(viewer.user_id, &ids).await?;

        for dto in &mut dtos {
            dto.user_data = Some(user_data.remove(&dto.id).unwrap_or_default());
        }

        Ok(dtos)
    }
}
