pub mod check;
pub mod forms;
pub mod ids;
pub mod progress;
pub mod reorder;
pub mod search;
pub mod store;
pub mod transform;
pub mod tree_ops;
