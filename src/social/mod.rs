//! Social content surface
//!
//! - `publisher` - the create pipeline (upload, attribute assembly, mint)
//! - `service` - the `SocialClient` facade the application talks to

pub mod publisher;
pub mod service;

pub use publisher::{ContentDraft, ContentPublisher, ImageUpload, ProgressFn, ProgressPhase};
pub use service::SocialClient;
