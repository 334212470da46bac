pub mod catalog;
pub mod chat_llm;
pub mod store;

pub use catalog::load_catalog;
pub use chat_llm::UpstreamChatAdapter;
pub use store::FileStore;
