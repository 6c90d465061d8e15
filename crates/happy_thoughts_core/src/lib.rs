pub mod domain;
pub mod ports;
pub mod query;
pub mod service;

pub use domain::{AuthSession, Identity, NewThought, Thought, User, UserCredentials};
pub use ports::{AuthProvider, PortError, PortResult, ThoughtRepository};
pub use query::{ListQuery, Page, SortOrder};
pub use service::ThoughtService;
