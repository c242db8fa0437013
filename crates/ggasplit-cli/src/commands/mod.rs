pub mod copy;
pub mod merge;
