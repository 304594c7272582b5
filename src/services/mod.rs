pub mod resume_parser;
pub mod sections;
pub mod text_extractor;

pub use resume_parser::parse_resume;
pub use sections::{SectionKind, SectionSpan, Sections};
pub use text_extractor::{ExtractionResult, TextExtractor};
