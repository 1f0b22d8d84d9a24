pub mod candidates;
pub mod library;
pub mod people;
pub mod projection;
pub mod ranking;
pub mod scoring;
pub mod similar_items;

pub use library::{ItemStore, PeopleIndex};
pub use projection::{DtoProjector, ResultProjector};
pub use similar_items::{get_similar_items, SimilarItemsRequest};
