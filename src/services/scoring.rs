use std::collections::HashSet;

use crate::{
    models::{Item, PersonAssociation, PersonKind},
    services::people::CreditIndex,
};

const RATING_POINTS: u32 = 10;
const GENRE_POINTS: u32 = 10;
const TAG_POINTS: u32 = 10;
const STUDIO_POINTS: u32 = 3;

/// Release years closer than this earn `YEAR_POINTS`
const SAME_DECADE: u32 = 10;
/// Release years closer than this earn another `YEAR_POINTS`
const SAME_HALF_DECADE: u32 = 5;
const YEAR_POINTS: u32 = 2;

/// Weight for a shared person matching none of the weighted roles
const UNRANKED_PERSON_POINTS: u32 = 1;

/// Signature shared by all similarity scorers
pub type ScoreFn = fn(&Item, &[PersonAssociation], &CreditIndex, &Item) -> u32;

/// Points for one shared credit, keyed on the role of the reference person
pub fn role_weight(kind: PersonKind) -> u32 {
    match kind {
        PersonKind::Director => 5,
        PersonKind::Actor | PersonKind::Composer | PersonKind::GuestStar => 3,
        PersonKind::Writer => 2,
        PersonKind::Other => UNRANKED_PERSON_POINTS,
    }
}

/// Credit weight of a reference person
///
/// The type tag and the parsed free-text role are both checked against the
/// weighted roles in order; the first hit decides.
pub fn credit_weight(person: &PersonAssociation) -> u32 {
    PersonKind::WEIGHTED
        .into_iter()
        .find(|kind| person.is(*kind))
        .map_or(UNRANKED_PERSON_POINTS, role_weight)
}

/// Scores how closely `candidate` relates to `reference`
///
/// Pure and total: missing ratings, years or empty attribute sets simply
/// contribute nothing.
pub fn similarity_score(
    reference: &Item,
    reference_people: &[PersonAssociation],
    credits: &CreditIndex,
    candidate: &Item,
) -> u32 {
    let mut points = 0;

    if let (Some(ours), Some(theirs)) = (&reference.official_rating, &candidate.official_rating) {
        if !ours.is_empty() && ours.to_lowercase() == theirs.to_lowercase() {
            points += RATING_POINTS;
        }
    }

    points += shared_count(&reference.genres, &candidate.genres) * GENRE_POINTS;
    points += shared_count(&reference.tags, &candidate.tags) * TAG_POINTS;
    points += shared_count(&reference.studios, &candidate.studios) * STUDIO_POINTS;

    points += reference_people
        .iter()
        .filter(|person| credits.credits(candidate.id, &person.name))
        .map(credit_weight)
        .sum::<u32>();

    if let (Some(ours), Some(theirs)) = (reference.production_year, candidate.production_year) {
        let diff = ours.abs_diff(theirs);
        if diff < SAME_DECADE {
            points += YEAR_POINTS;
        }
        if diff < SAME_HALF_DECADE {
            points += YEAR_POINTS;
        }
    }

    points
}

/// Number of distinct values present in both lists, ignoring case
fn shared_count(ours: &[String], theirs: &[String]) -> u32 {
    let theirs: HashSet<String> = theirs.iter().map(|v| v.to_lowercase()).collect();
    let ours: HashSet<String> = ours.iter().map(|v| v.to_lowercase()).collect();
    ours.intersection(&theirs).count() as u32
}
