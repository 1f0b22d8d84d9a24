use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// Identifier of a library item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    /// Accepts both hyphenated and simple (32 hex digit) forms
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(ItemId)
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Item-type tag of a library item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Movie,
    Series,
    Season,
    Episode,
    Trailer,
    MusicAlbum,
    MusicArtist,
    Audio,
    MusicVideo,
    BoxSet,
    Folder,
    CollectionFolder,
    UserRootFolder,
    AggregateFolder,
}

impl ItemKind {
    const ALL: [ItemKind; 14] = [
        ItemKind::Movie,
        ItemKind::Series,
        ItemKind::Season,
        ItemKind::Episode,
        ItemKind::Trailer,
        ItemKind::MusicAlbum,
        ItemKind::MusicArtist,
        ItemKind::Audio,
        ItemKind::MusicVideo,
        ItemKind::BoxSet,
        ItemKind::Folder,
        ItemKind::CollectionFolder,
        ItemKind::UserRootFolder,
        ItemKind::AggregateFolder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Movie => "Movie",
            ItemKind::Series => "Series",
            ItemKind::Season => "Season",
            ItemKind::Episode => "Episode",
            ItemKind::Trailer => "Trailer",
            ItemKind::MusicAlbum => "MusicAlbum",
            ItemKind::MusicArtist => "MusicArtist",
            ItemKind::Audio => "Audio",
            ItemKind::MusicVideo => "MusicVideo",
            ItemKind::BoxSet => "BoxSet",
            ItemKind::Folder => "Folder",
            ItemKind::CollectionFolder => "CollectionFolder",
            ItemKind::UserRootFolder => "UserRootFolder",
            ItemKind::AggregateFolder => "AggregateFolder",
        }
    }

    /// Whether items of this kind can contain other items
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ItemKind::Folder
                | ItemKind::CollectionFolder
                | ItemKind::UserRootFolder
                | ItemKind::AggregateFolder
        )
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown item type: {}", s))
    }
}

/// A media item owned by the library store
///
/// Items are read-only snapshots while a ranking call is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub studios: Vec<String>,
    #[serde(default)]
    pub official_rating: Option<String>,
    #[serde(default)]
    pub production_year: Option<i32>,
    /// Artists credited on this item (albums, tracks, music videos)
    #[serde(default)]
    pub artist_ids: Vec<ItemId>,
}

impl Item {
    /// Creates a bare item with no metadata
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            parent_id: None,
            genres: Vec::new(),
            tags: Vec::new(),
            studios: Vec::new(),
            official_rating: None,
            production_year: None,
            artist_ids: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: ItemId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_studios(mut self, studios: &[&str]) -> Self {
        self.studios = studios.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_rating(mut self, rating: &str) -> Self {
        self.official_rating = Some(rating.to_string());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.production_year = Some(year);
        self
    }

    pub fn with_artists(mut self, artist_ids: Vec<ItemId>) -> Self {
        self.artist_ids = artist_ids;
        self
    }

    /// True when any credited artist is in `excluded`
    pub fn has_any_artist(&self, excluded: &[ItemId]) -> bool {
        self.artist_ids.iter().any(|id| excluded.contains(id))
    }
}
