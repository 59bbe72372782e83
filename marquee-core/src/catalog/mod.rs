//! The result-set reconstruction engine.
//!
//! Join queries against the catalog fan out: a title joined to three
//! dimension tables and an episode table produces one physical row per
//! combination, each repeating the title's scalar columns. The modules here
//! rebuild the nested object graph from that stream:
//!
//! - [`predicate`] assembles the optional WHERE/ORDER BY clauses with bound
//!   parameters and an allow-listed sort column.
//! - [`row`] decodes one physical row into typed sub-records, mapping
//!   NULL-id outer-join children to `None`.
//! - [`accumulate`] collapses the fan-out: an arena of root entities in
//!   first-encounter order, with per-root seen-sets so every association
//!   appears exactly once. The grouped (season) query feeds the same arena
//!   as a second phase, forming a full outer union on title identity.
//!
//! The accumulators are pure and never touch the database, so the whole
//! rebuild is testable from hand-built rows.

pub mod accumulate;
pub mod predicate;
pub mod row;

pub use accumulate::{SeasonAccumulator, TitleAccumulator};
pub use predicate::TitlePredicate;
pub use row::{FlatRow, GroupedRow, SeasonRecord, TitleScalars};
