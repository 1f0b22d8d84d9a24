use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::{ItemId, PersonAssociation},
    services::library::PeopleIndex,
};

/// Case-insensitive set of person names credited on each candidate item
#[derive(Debug, Clone, Default)]
pub struct CreditIndex {
    names_by_item: HashMap<ItemId, HashSet<String>>,
}

impl CreditIndex {
    /// Builds the index from raw associations
    ///
    /// Blank names are dropped and repeated credits of the same person on one
    /// item collapse into a single entry.
    pub fn build(associations: &[PersonAssociation]) -> Self {
        let mut names_by_item: HashMap<ItemId, HashSet<String>> = HashMap::new();

        for person in associations {
            if person.name.trim().is_empty() {
                continue;
            }
            names_by_item
                .entry(person.item_id)
                .or_default()
                .insert(fold_name(&person.name));
        }

        Self { names_by_item }
    }

    /// Whether `name` is credited on `item_id`, ignoring case
    pub fn credits(&self, item_id: ItemId, name: &str) -> bool {
        self.names_by_item
            .get(&item_id)
            .is_some_and(|names| names.contains(&fold_name(name)))
    }

    /// Distinct names credited on `item_id`
    pub fn name_count(&self, item_id: ItemId) -> usize {
        self.names_by_item.get(&item_id).map_or(0, HashSet::len)
    }

    pub fn item_count(&self) -> usize {
        self.names_by_item.len()
    }
}

fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// People data needed to score candidates against one reference item
#[derive(Debug, Clone, Default)]
pub struct ReferencePeople {
    /// Associations on the reference item itself
    pub credited: Vec<PersonAssociation>,
    /// Names credited on every item sharing a person with the reference
    pub credits: CreditIndex,
}

/// Fetches the reference item's people and the associations of every item
/// that shares one of them
///
/// Both reads are issued concurrently. A failure of either is returned as is.
pub async fn lookup_people(
    index: &dyn PeopleIndex,
    reference_id: ItemId,
) -> AppResult<ReferencePeople> {
    let (credited, appearing_in) = tokio::try_join!(
        index.people_of(reference_id),
        index.people_appearing_in(reference_id)
    )?;

    let credits = CreditIndex::build(&appearing_in);

    tracing::debug!(
        reference_id = %reference_id,
        index = index.name(),
        credited = credited.len(),
        associations = appearing_in.len(),
        linked_items = credits.item_count(),
        "People lookup completed"
    );

    Ok(ReferencePeople { credited, credits })
}
