pub mod context;
pub mod detector;
pub mod headers;
pub mod markdown;
pub mod rows;
pub mod stats;

pub use context::{ContextExtractor, TitleGenerator, NO_CONTEXT};
pub use detector::TableDetector;
pub use headers::{HeaderExtractor, HeaderNormalizer, UNNAMED_COLUMN};
pub use markdown::MarkdownRenderer;
pub use rows::RowExtractor;
pub use stats::{StatsCalculator, TypeInferencer};
