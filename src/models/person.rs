use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::ItemId;

/// Role-type vocabulary for people credited on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonKind {
    Director,
    Actor,
    Composer,
    GuestStar,
    Writer,
    Other,
}

impl PersonKind {
    /// Roles that carry a credit weight, in lookup order
    pub const WEIGHTED: [PersonKind; 5] = [
        PersonKind::Director,
        PersonKind::Actor,
        PersonKind::Composer,
        PersonKind::GuestStar,
        PersonKind::Writer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonKind::Director => "Director",
            PersonKind::Actor => "Actor",
            PersonKind::Composer => "Composer",
            PersonKind::GuestStar => "GuestStar",
            PersonKind::Writer => "Writer",
            PersonKind::Other => "Other",
        }
    }
}

impl Display for PersonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PersonKind::WEIGHTED
            .into_iter()
            .chain(std::iter::once(PersonKind::Other))
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown person type: {}", s))
    }
}

/// A person credited on an item
///
/// The free-text `role` (e.g. a character name, or "Director" on loosely
/// tagged metadata) is matched against the role vocabulary once, when the
/// association is built, and kept as `role_kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonAssociation {
    pub name: String,
    pub kind: PersonKind,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub role_kind: Option<PersonKind>,
    pub item_id: ItemId,
}

impl PersonAssociation {
    pub fn new(
        name: impl Into<String>,
        kind: PersonKind,
        role: Option<String>,
        item_id: ItemId,
    ) -> Self {
        let role_kind = role.as_deref().and_then(|r| r.parse().ok());
        Self {
            name: name.into(),
            kind,
            role,
            role_kind,
            item_id,
        }
    }

    /// Builds an association from storage text, falling back to `Other` for
    /// unrecognised type tags
    pub fn from_raw(name: String, kind: &str, role: Option<String>, item_id: ItemId) -> Self {
        let kind = kind.parse().unwrap_or(PersonKind::Other);
        Self::new(name, kind, role, item_id)
    }

    /// True when either the type tag or the parsed role is `kind`
    pub fn is(&self, kind: PersonKind) -> bool {
        self.kind == kind || self.role_kind == Some(kind)
    }
}
