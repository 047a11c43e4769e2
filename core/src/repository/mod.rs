pub mod file;
pub mod memory;
pub mod traits;

// Re-export
pub use file::FileSummaryStore;
pub use memory::InMemorySummaryStore;
pub use traits::SummaryStore;
