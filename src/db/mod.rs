pub mod memory;
pub mod mongodb;
pub mod records;
