use std::collections::BTreeSet;

use lattice::{ClassMatchType, IoMatchType, Iri};

use crate::engine::ConceptMatcher;
use crate::types::MatchError;

/// Degree at which one category counts as lying inside another.
pub const CATEGORY_COVER_THRESHOLD: IoMatchType = IoMatchType::Plugin;

/// Set-level match between a goal's categories and a service's categories.
///
/// A service category `s` is covered when some goal category `g` has
/// `match(s, g) >= Plugin` (that is, `s ⊑ g`); goal categories are covered
/// symmetrically. The verdict is
///
/// - [`ClassMatchType::ServiceSubsetOfGoal`] when every service category is
///   covered,
/// - [`ClassMatchType::GoalSubsetOfService`] when every goal category is
///   covered,
/// - [`ClassMatchType::Intersection`] when anything is covered at all,
/// - `None` otherwise, or when either set is empty.
pub async fn classify_categories<M>(
    matcher: &M,
    goal: &BTreeSet<Iri>,
    service: &BTreeSet<Iri>,
) -> Result<Option<ClassMatchType>, MatchError>
where
    M: ConceptMatcher + ?Sized,
{
    if goal.is_empty() || service.is_empty() {
        return Ok(None);
    }

    let service_in_goal = matcher.match_sets(service, goal).await?;
    let goal_in_service = matcher.match_sets(goal, service).await?;

    let covered = |table: &lattice::MatchTable, origins: &BTreeSet<Iri>| -> usize {
        origins
            .iter()
            .filter(|origin| {
                table.row(origin).is_some_and(|row| {
                    row.values()
                        .any(|m| m.match_type() >= CATEGORY_COVER_THRESHOLD)
                })
            })
            .count()
    };

    let service_covered = covered(&service_in_goal, service);
    let goal_covered = covered(&goal_in_service, goal);

    let verdict = if service_covered == service.len() {
        Some(ClassMatchType::ServiceSubsetOfGoal)
    } else if goal_covered == goal.len() {
        Some(ClassMatchType::GoalSubsetOfService)
    } else if service_covered > 0 || goal_covered > 0 {
        Some(ClassMatchType::Intersection)
    } else {
        None
    };
    Ok(verdict)
}
