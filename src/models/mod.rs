pub mod item;
pub mod person;
pub mod query;

pub use item::{Item, ItemId, ItemKind};
pub use person::{PersonAssociation, PersonKind};
pub use query::{ItemDto, ItemFilter, QueryResult, Scope, UserItemData, ViewerContext};
