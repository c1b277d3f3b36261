pub mod csv;
pub mod summary;

pub use summary::should_use_colors;
