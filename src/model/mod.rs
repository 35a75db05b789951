pub mod layout;
pub mod tree;

pub use layout::ScenarioLayout;
pub use tree::{Level, MetricKey, ScorePath, ScoreTree, Signal, StatKind, Subtree};
