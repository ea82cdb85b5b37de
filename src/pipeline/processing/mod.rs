// Pipeline processing: consolidation, normalization and identity resolution

pub mod consolidate;
pub mod matching;
pub mod normalize;
