//! The six generation stages. Each is a pure transformation from the client
//! profile and prior stage outputs to the next artifact, mediated entirely
//! through the model gateway.

pub mod content;
pub mod faq;
pub mod image;
pub mod metadata;
pub mod outline;
pub mod topic;
