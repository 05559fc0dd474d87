//! Output module
//! Report structure and the console/JSON/Markdown formatters

pub mod formatter;
pub mod report;

pub use formatter::{ConsoleFormatter, JsonFormatter, MarkdownFormatter, OutputFormatter, ReportGenerator};
pub use report::ResultsReport;
