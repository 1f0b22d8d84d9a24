use std::collections::HashMap;

use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Item, ItemFilter, ItemId, PersonAssociation, Scope, UserItemData},
    services::library::{ItemStore, PeopleIndex},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const ITEM_COLUMNS: &str = "id, name, kind, parent_id, genres, tags, studios, \
                            official_rating, production_year, artist_ids";

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    kind: String,
    parent_id: Option<Uuid>,
    genres: Vec<String>,
    tags: Vec<String>,
    studios: Vec<String>,
    official_rating: Option<String>,
    production_year: Option<i32>,
    artist_ids: Vec<Uuid>,
}

impl TryFrom<ItemRow> for Item {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse()
            .map_err(|e| AppError::Internal(format!("Item {}: {}", row.id, e)))?;

        Ok(Item {
            id: ItemId(row.id),
            name: row.name,
            kind,
            parent_id: row.parent_id.map(ItemId),
            genres: row.genres,
            tags: row.tags,
            studios: row.studios,
            official_rating: row.official_rating,
            production_year: row.production_year,
            artist_ids: row.artist_ids.into_iter().map(ItemId).collect(),
        })
    }
}

#[derive(Debug, FromRow)]
struct PersonRow {
    name: String,
    kind: String,
    role: Option<String>,
    item_id: Uuid,
}

impl From<PersonRow> for PersonAssociation {
    fn from(row: PersonRow) -> Self {
        PersonAssociation::from_raw(row.name, &row.kind, row.role, ItemId(row.item_id))
    }
}

#[derive(Debug, FromRow)]
struct UserDataRow {
    item_id: Uuid,
    played: bool,
    is_favorite: bool,
    play_count: i32,
}

/// Library store and people index backed by PostgreSQL
#[derive(Clone)]
pub struct PgLibrary {
    pool: PgPool,
}

impl PgLibrary {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn user_root_id(&self, user_id: Uuid) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT root_folder_id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    async fn fetch_item(&self, sql: &str, id: Uuid) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, ItemRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Item::try_from)
            .transpose()
    }
}

#[async_trait::async_trait]
impl ItemStore for PgLibrary {
    async fn resolve_item(&self, id: ItemId) -> AppResult<Item> {
        let sql = format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS);
        self.fetch_item(&sql, id.0)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {}", id)))
    }

    async fn root_folder(&self, user_id: Option<Uuid>) -> AppResult<Item> {
        match user_id {
            Some(user_id) => {
                let root_id = self.user_root_id(user_id).await?;
                self.resolve_item(ItemId(root_id)).await
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM items WHERE parent_id IS NULL AND kind = 'AggregateFolder' \
                     ORDER BY id LIMIT 1",
                    ITEM_COLUMNS
                );
                sqlx::query_as::<_, ItemRow>(&sql)
                    .fetch_optional(&self.pool)
                    .await?
                    .map(Item::try_from)
                    .transpose()?
                    .ok_or_else(|| AppError::NotFound("Root folder".to_string()))
            }
        }
    }

    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<Item>> {
        let container = match filter.scope {
            Scope::Container(id) => Some(id.0),
            Scope::UserRoot(user_id) => Some(self.user_root_id(user_id).await?),
            Scope::Global => None,
        };

        let kinds: Vec<String> = filter
            .include_types
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();
        let excluded: Vec<Uuid> = filter.exclude_artist_ids.iter().map(|id| id.0).collect();

        let scope_clause = match (container, filter.recursive) {
            (None, _) => "TRUE",
            (Some(_), true) => {
                "id IN (
                    WITH RECURSIVE scope(id) AS (
                        SELECT id FROM items WHERE parent_id = $3
                        UNION ALL
                        SELECT i.id FROM items i JOIN scope s ON i.parent_id = s.id
                    )
                    SELECT id FROM scope
                )"
            }
            (Some(_), false) => "parent_id = $3",
        };

        let sql = format!(
            "SELECT {} FROM items
             WHERE kind = ANY($1)
               AND NOT (artist_ids && $2)
               AND {}
             ORDER BY sort_name, id",
            ITEM_COLUMNS, scope_clause
        );

        let mut query = sqlx::query_as::<_, ItemRow>(&sql).bind(kinds).bind(excluded);
        if let Some(container) = container {
            query = query.bind(container);
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }

    async fn user_data(
        &self,
        user_id: Uuid,
        item_ids: &[ItemId],
    ) -> AppResult<HashMap<ItemId, UserItemData>> {
        let ids: Vec<Uuid> = item_ids.iter().map(|id| id.0).collect();

        let rows = sqlx::query_as::<_, UserDataRow>(
            "SELECT item_id, played, is_favorite, play_count
             FROM user_item_data
             WHERE user_id = $1 AND item_id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    ItemId(row.item_id),
                    UserItemData {
                        played: row.played,
                        is_favorite: row.is_favorite,
                        play_count: row.play_count.max(0) as u32,
                    },
                )
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl PeopleIndex for PgLibrary {
    async fn people_of(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>> {
        let rows = sqlx::query_as::<_, PersonRow>(
            "SELECT name, kind, role, item_id
             FROM people
             WHERE item_id = $1
             ORDER BY sort_order",
        )
        .bind(item_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PersonAssociation::from).collect())
    }

    async fn people_appearing_in(&self, item_id: ItemId) -> AppResult<Vec<PersonAssociation>> {
        let rows = sqlx::query_as::<_, PersonRow>(
            "SELECT p.name, p.kind, p.role, p.item_id
             FROM people p
             WHERE p.item_id IN (
                 SELECT o.item_id FROM people o
                 WHERE lower(o.name) IN (
                     SELECT lower(r.name) FROM people r WHERE r.item_id = $1
                 )
             )",
        )
        .bind(item_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PersonAssociation::from).collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
