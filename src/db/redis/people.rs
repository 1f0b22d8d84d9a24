use crate::{
    cached,
    db::redis::{Cache, CacheKey},
    error::AppResult,
    models::{ItemId, PersonAssociation},
    services::library::PeopleIndex,
};

/// People index that keeps lookups in Redis for `ttl` seconds
///
/// Only the people layer is cached; scoring always runs on fresh inputs
/// handed to it per request.
pub struct CachedPeopleIndex<P> {
    inner: P,
    cache: Cache,
    ttl: u64,
}

impl<P: PeopleIndex> CachedPeopleIndex<P> {
    pub fn new(inner: P, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl<P: PeopleIndex> PeopleIndex for CachedPeopleIndex<P> {
    async fn people_of(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>> {
        cached!(
            self.cache,
            CacheKey::People(item_id),
            self.ttl,
            self.inner.people_of(item_id)
        )
    }

    async fn people_appearing_in(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>> {
        cached!(
            self.cache,
            CacheKey::PeopleAppearingIn(item_id),
            self.ttl,
            self.inner.people_appearing_in(item_id)
        )
    }

    fn name(&self) -> &'static str {
        "redis-cached"
    }
}
