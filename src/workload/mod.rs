//! Matrix inputs, placeholder merging, work-item expansion and content fingerprints.
mod expand;
mod fingerprint;
mod template;
mod types;

pub use expand::{WorkItems, expand};
pub use fingerprint::{ABSENT_CONTENT_FINGERPRINT, content_fingerprint};
pub use template::merge_placeholders;
pub use types::{HttpVerb, Instance, RequestTemplate, Runner, User, WorkItem};
