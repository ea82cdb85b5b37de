// Pipeline ingestion: decoding store exports and parsing their prices

pub mod price;
pub mod source_reader;

pub use price::parse_price;
pub use source_reader::{SourceRead, SourceReader};
