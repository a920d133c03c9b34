mod memory;
pub use memory::MemorySource;
