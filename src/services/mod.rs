pub mod analyzer;
pub mod producer;
pub mod queue;
pub mod store;
pub mod worker;
