mod discovery;
mod parsers;
mod paths;
mod pipeline;
mod types;

pub use discovery::{FileStamp, list_files, needs_reparse};
pub use parsers::{ClaudeParser, CodexParser, GeminiParser, SessionParser, parse_session, parser_for};
pub use paths::{ProviderRoots, default_root};
pub use pipeline::sync_provider;
pub use types::{IngestError, Result, SyncIssue, SyncStats};
