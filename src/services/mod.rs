//! Service layer modules for external integrations.
//!
//! Contains the analysis service client and the document download sink.

pub mod api_client;
pub mod downloads;

pub use api_client::{AnalysisApi, ApiClient};
pub use downloads::{synopsis_file_name, DocumentSink, DownloadDir};
