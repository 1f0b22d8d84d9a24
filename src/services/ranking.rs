use crate::{
    models::Item,
    services::{people::ReferencePeople, scoring::ScoreFn},
};

/// Candidates scoring at or below this are treated as noise
pub const MIN_SCORE: u32 = 2;

/// A candidate paired with its score against the reference
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub item: Item,
    pub score: u32,
}

/// Ranked candidates plus the number that passed the score threshold
#[derive(Debug, Clone, Default)]
pub struct RankedResult {
    pub items: Vec<ScoredCandidate>,
    pub total_matches: usize,
}

impl RankedResult {
    pub fn into_items(self) -> Vec<Item> {
        self.items.into_iter().map(|c| c.item).collect()
    }
}

/// Scores, filters, orders and caps `candidates` against `reference`
///
/// Ties keep the order the candidates arrived in. `total_matches` counts
/// every candidate above `MIN_SCORE`, before `limit` is applied.
pub fn rank_candidates(
    reference: &Item,
    people: &ReferencePeople,
    candidates: Vec<Item>,
    limit: Option<usize>,
    score_fn: ScoreFn,
) -> RankedResult {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != reference.id)
        .filter_map(|candidate| {
            let score = score_fn(reference, &people.credited, &people.credits, &candidate);
            (score > MIN_SCORE).then_some(ScoredCandidate {
                item: candidate,
                score,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let total_matches = scored.len();

    if let Some(limit) = limit {
        scored.truncate(limit);
    }

    RankedResult {
        items: scored,
        total_matches,
    }
}
