//! The two match-degree lattices.
//!
//! [`IoMatchType`] grades how well one concept satisfies another during
//! input/output matching. [`ClassMatchType`] grades how two sets of
//! classification concepts relate. Each enum has its own explicit order
//! table, and the two have no ordering or conversion between them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Degree of match between two concepts.
///
/// `Fail < PartialSubsume < PartialPlugin < Subsume < Plugin < Exact`.
/// The two partial degrees only come out of composite derivation; a single
/// pairwise match yields `Exact`, `Plugin`, `Subsume` or `Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoMatchType {
    Fail,
    PartialSubsume,
    PartialPlugin,
    Subsume,
    Plugin,
    Exact,
}

impl IoMatchType {
    /// Weakest to strongest.
    pub const ORDER: [IoMatchType; 6] = [
        IoMatchType::Fail,
        IoMatchType::PartialSubsume,
        IoMatchType::PartialPlugin,
        IoMatchType::Subsume,
        IoMatchType::Plugin,
        IoMatchType::Exact,
    ];

    pub const fn rank(self) -> u8 {
        match self {
            IoMatchType::Fail => 0,
            IoMatchType::PartialSubsume => 1,
            IoMatchType::PartialPlugin => 2,
            IoMatchType::Subsume => 3,
            IoMatchType::Plugin => 4,
            IoMatchType::Exact => 5,
        }
    }

    /// Map the two directions of a subsumption check to a degree.
    ///
    /// `origin_sub_destination` is "origin subclass-of destination",
    /// `destination_sub_origin` the reverse.
    pub const fn from_subsumption(origin_sub_destination: bool, destination_sub_origin: bool) -> Self {
        match (origin_sub_destination, destination_sub_origin) {
            (true, true) => IoMatchType::Exact,
            (true, false) => IoMatchType::Plugin,
            (false, true) => IoMatchType::Subsume,
            (false, false) => IoMatchType::Fail,
        }
    }

    /// INTERSECTION verdict for a group whose strongest member is `best` and
    /// weakest is `worst`.
    ///
    /// A failing criterion downgrades the verdict, but a strong match among
    /// failing ones survives as a partial degree. Partial worst degrees keep
    /// at least their own strength.
    pub fn intersection(best: IoMatchType, worst: IoMatchType) -> IoMatchType {
        use IoMatchType::*;

        let (best, worst) = if best < worst { (worst, best) } else { (best, worst) };
        let over_fail = match best {
            Exact | Plugin => PartialPlugin,
            Subsume => PartialSubsume,
            PartialPlugin | PartialSubsume | Fail => Fail,
        };
        match worst {
            Exact => Exact,
            Plugin => Plugin,
            Subsume => Subsume,
            PartialPlugin => PartialPlugin.max(over_fail),
            PartialSubsume => PartialSubsume.max(over_fail),
            Fail => over_fail,
        }
    }

    /// Degrees produced by a single pairwise match.
    pub const fn is_pairwise(self) -> bool {
        !matches!(self, IoMatchType::PartialPlugin | IoMatchType::PartialSubsume)
    }

    /// Whether `self` lies in the inclusive range `worst..=best`.
    /// An inverted range contains nothing.
    pub fn within(self, worst: IoMatchType, best: IoMatchType) -> bool {
        worst <= best && worst <= self && self <= best
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            IoMatchType::Fail => "fail",
            IoMatchType::PartialSubsume => "partial_subsume",
            IoMatchType::PartialPlugin => "partial_plugin",
            IoMatchType::Subsume => "subsume",
            IoMatchType::Plugin => "plugin",
            IoMatchType::Exact => "exact",
        }
    }
}

impl Ord for IoMatchType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for IoMatchType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IoMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Degree of match between a goal's classification set and a service's.
///
/// `Intersection < GoalSubsetOfService < ServiceSubsetOfGoal`. Absence of any
/// overlap is modelled as `None` by callers rather than as a fourth degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassMatchType {
    /// The sets overlap but neither contains the other.
    Intersection,
    /// Every goal category is covered by the service; the service is broader.
    GoalSubsetOfService,
    /// Every service category is covered by the goal.
    ServiceSubsetOfGoal,
}

impl ClassMatchType {
    pub const ORDER: [ClassMatchType; 3] = [
        ClassMatchType::Intersection,
        ClassMatchType::GoalSubsetOfService,
        ClassMatchType::ServiceSubsetOfGoal,
    ];

    pub const fn rank(self) -> u8 {
        match self {
            ClassMatchType::Intersection => 0,
            ClassMatchType::GoalSubsetOfService => 1,
            ClassMatchType::ServiceSubsetOfGoal => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ClassMatchType::Intersection => "intersection",
            ClassMatchType::GoalSubsetOfService => "gssos",
            ClassMatchType::ServiceSubsetOfGoal => "sssog",
        }
    }
}

impl Ord for ClassMatchType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for ClassMatchType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClassMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IoMatchType::*;

    #[test]
    fn order_table_is_strictly_increasing() {
        for pair in IoMatchType::ORDER.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
        }
        for pair in ClassMatchType::ORDER.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn ordering_is_total_antisymmetric_and_transitive() {
        for a in IoMatchType::ORDER {
            for b in IoMatchType::ORDER {
                let ab = a.cmp(&b);
                assert_eq!(ab, b.cmp(&a).reverse());
                assert_eq!(ab == Ordering::Equal, a == b);
                assert_eq!(a.max(b), if ab == Ordering::Less { b } else { a });
                assert_eq!(a.min(b), if ab == Ordering::Less { a } else { b });
                for c in IoMatchType::ORDER {
                    if a <= b && b <= c {
                        assert!(a <= c);
                    }
                }
            }
        }
    }

    #[test]
    fn subsumption_mapping() {
        assert_eq!(IoMatchType::from_subsumption(true, true), Exact);
        assert_eq!(IoMatchType::from_subsumption(true, false), Plugin);
        assert_eq!(IoMatchType::from_subsumption(false, true), Subsume);
        assert_eq!(IoMatchType::from_subsumption(false, false), Fail);
    }

    #[test]
    fn intersection_rule_for_pairwise_degrees() {
        assert_eq!(IoMatchType::intersection(Exact, Exact), Exact);
        assert_eq!(IoMatchType::intersection(Exact, Plugin), Plugin);
        assert_eq!(IoMatchType::intersection(Plugin, Subsume), Subsume);
        assert_eq!(IoMatchType::intersection(Exact, Fail), PartialPlugin);
        assert_eq!(IoMatchType::intersection(Plugin, Fail), PartialPlugin);
        assert_eq!(IoMatchType::intersection(Subsume, Fail), PartialSubsume);
        assert_eq!(IoMatchType::intersection(Fail, Fail), Fail);
    }

    #[test]
    fn intersection_never_exceeds_best_and_is_total() {
        for best in IoMatchType::ORDER {
            for worst in IoMatchType::ORDER.into_iter().filter(|w| *w <= best) {
                let verdict = IoMatchType::intersection(best, worst);
                assert!(verdict <= best, "{best}/{worst} -> {verdict}");
            }
        }
    }

    #[test]
    fn intersection_is_monotone_in_worst() {
        for best in IoMatchType::ORDER {
            let verdicts: Vec<_> = IoMatchType::ORDER
                .into_iter()
                .filter(|w| *w <= best)
                .map(|w| IoMatchType::intersection(best, w))
                .collect();
            for pair in verdicts.windows(2) {
                assert!(pair[0] <= pair[1], "best={best}: {verdicts:?}");
            }
        }
    }

    #[test]
    fn intersection_accepts_swapped_arguments() {
        assert_eq!(IoMatchType::intersection(Fail, Exact), PartialPlugin);
    }

    #[test]
    fn within_handles_inverted_range() {
        assert!(Plugin.within(Subsume, Exact));
        assert!(!Fail.within(Subsume, Exact));
        assert!(!Plugin.within(Exact, Subsume));
    }

    #[test]
    fn partial_degrees_are_not_pairwise() {
        let pairwise: Vec<_> = IoMatchType::ORDER
            .into_iter()
            .filter(|m| m.is_pairwise())
            .collect();
        assert_eq!(pairwise, vec![Fail, Subsume, Plugin, Exact]);
    }

    #[test]
    fn serde_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&PartialPlugin).unwrap(), "\"partial_plugin\"");
        assert_eq!(
            serde_json::to_string(&ClassMatchType::ServiceSubsetOfGoal).unwrap(),
            "\"service_subset_of_goal\""
        );
    }
}
