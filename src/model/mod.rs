pub mod question;
pub mod tree;
pub mod dataset;
pub mod tracker;
pub mod config;

pub use question::*;
pub use tree::*;
pub use dataset::*;
pub use tracker::*;
pub use config::*;
