//! # semdisc lattice (`lattice`)
//!
//! Value types shared by every layer of the discovery engine:
//!
//! - [`IoMatchType`]: the six-degree input/output match lattice
//!   (`Fail < PartialSubsume < PartialPlugin < Subsume < Plugin < Exact`).
//! - [`ClassMatchType`]: the independent classification-set lattice.
//! - [`MatchResult`]: an atomic pairwise verdict or a composite over several
//!   verdicts about the same resource.
//! - [`combine`], [`combine_single`] and [`MultimapMerger`]: pure UNION /
//!   INTERSECTION merging.
//! - [`MatchTable`]: the complete origin × destination result table.
//!
//! Nothing in this crate performs I/O.
//!
//! ## Example
//!
//! ```
//! use lattice::{combine, Combinator, Iri, IoMatchType, MatchResult};
//!
//! let results = vec![
//!     MatchResult::atomic("urn:op", "urn:a", IoMatchType::Exact, "a"),
//!     MatchResult::atomic("urn:op", "urn:b", IoMatchType::Plugin, "b"),
//!     MatchResult::atomic("urn:op", "urn:c", IoMatchType::Fail, "c"),
//! ];
//! let merged = combine(results, Combinator::Intersection);
//! assert_eq!(merged[&Iri::new("urn:op")].match_type(), IoMatchType::PartialPlugin);
//! ```

mod combinator;
mod error;
mod iri;
mod match_type;
mod merger;
mod result;
mod table;

pub use crate::combinator::{combine, combine_single, Combinator};
pub use crate::error::{CombinatorError, ScoreAlreadySet};
pub use crate::iri::Iri;
pub use crate::match_type::{ClassMatchType, IoMatchType};
pub use crate::merger::{MatchMultimap, MultimapMerger};
pub use crate::result::{AtomicMatch, CompositeMatch, MatchResult};
pub use crate::table::MatchTable;
