//! Format resolution, download and delivery

pub mod delivery;
pub mod error;
pub mod source;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use delivery::{DeliveryKind, DeliveryPipeline, DeliveryPolicy};
pub use error::DownloadError;
pub use source::{DownloadResult, DownloadTarget, FormatDescriptor, FormatListing, MediaResolver, YtDlpResolver};
