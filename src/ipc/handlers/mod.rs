pub mod assignments;
pub mod core;
pub mod exports;
pub mod sessions;
