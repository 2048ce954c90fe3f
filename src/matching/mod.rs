//! Pure name-matching engine: no I/O, no logging.

pub mod parser;
pub mod preferences;
pub mod ranker;
pub mod selector;
pub mod similarity;

pub use parser::parse;
pub use preferences::filter_candidates;
pub use ranker::{rank, RankingBucket};
pub use selector::select_best_slug;
