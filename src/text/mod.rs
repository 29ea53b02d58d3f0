//! Text preparation: stress annotation, markup normalization,
//! sentence segmentation, and bounded splitting

pub mod markup;
pub mod segment;
pub mod sentence;
pub mod stress;

pub use segment::split_sentence;
pub use sentence::split_sentences;
pub use stress::StressAnnotator;
