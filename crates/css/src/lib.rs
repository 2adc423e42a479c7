pub mod accumulator;
pub mod blocks;
pub mod sheet;

// Re-exports so other crates can just use `css::...` nicely.
pub use accumulator::{SheetHandle, StyleAccumulator};
pub use blocks::split_rule_blocks;
pub use sheet::RuleSheet;
