pub mod accounts;
pub mod bookmarks;
pub mod catalog;
pub mod chat;
pub mod domain;
pub mod filter;
pub mod ports;
pub mod preview;
pub mod sse;
pub mod store;
pub mod submissions;
pub mod workflow;

pub use domain::{
    Account, ApprovalStatus, ChatMessage, ChatRole, Department, NewSubmission, Resource,
    ResourceType, Role, Semester, StudentSubmission,
};
pub use ports::{ByteStream, ChatCompletionService, KeyValueStore, PortError, PortResult};
