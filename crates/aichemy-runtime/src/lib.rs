pub mod activity;
pub mod config;
pub mod conversation;
pub mod debounce;
pub mod error;
pub mod examples;
pub mod skills;
pub mod store;
pub mod tools;
pub mod transport;
pub mod workflow;

pub use config::{Config, StorageBackend, resolve_data_dir};
pub use conversation::{Conversation, ConversationState, Phase, Turn, TurnId};
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use store::{BackendClient, ProjectStore, SqliteStore};
pub use transport::{AgentTransport, EventStream, HttpTransport, MockTransport};
pub use workflow::{ComposedPrompt, PropertySet, Workflow, WorkflowSelection};
