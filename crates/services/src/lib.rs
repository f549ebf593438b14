pub mod persistence;
pub mod store;

pub use persistence::{JsonFileStorage, MemoryStorage, StateStorage};
pub use store::{AppendOutcome, ChatState, ConversationStore};
