pub mod archive_retriever;
pub mod batcher;
pub mod mirror_copier;
pub mod queue_clearer;
pub mod reconciliation;
pub mod result_parser;
pub mod tree_classifier;
pub mod upload_coordinator;

pub use archive_retriever::ArchiveRetriever;
pub use batcher::Batcher;
pub use queue_clearer::QueueClearer;
pub use reconciliation::ReconciliationTracker;
pub use result_parser::{NoticeResultParser, ResultParser};
pub use tree_classifier::TreeClassifier;
pub use upload_coordinator::UploadCoordinator;
