pub mod fallback;
pub mod summary;
pub mod syncer;
