pub mod dump;
pub mod report;

pub use dump::DumpArgs;
