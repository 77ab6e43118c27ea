pub mod batch;
pub mod classification;
pub mod mirror;
pub mod outcome;

pub use batch::Batch;
pub use classification::{Classification, DirectoryClassification};
pub use mirror::DirectoryMirror;
pub use outcome::UploadOutcome;
