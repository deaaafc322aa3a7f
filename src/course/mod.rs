pub mod fetcher;
pub mod payload;
pub mod provider;
pub mod quote;
pub mod report;

pub use fetcher::RemoteCourseSource;
pub use payload::{RawPayload, StatusGlyph, TaskRecord, normalize};
pub use provider::{CourseSource, FetchOutcome, QuoteSource};
pub use quote::RemoteQuoteSource;
pub use report::{Report, ReportFormatter};
