//! Client for the Vedomost attendance service.
//!
//! [`http::ApiClient`] wraps the REST API with session handling,
//! [`api::AttendanceApi`] is the typed surface the UI talks to, and
//! [`store::Store`] owns the client state and drives every user action
//! through a load/merge/render cycle.

pub mod api;
pub mod error;
pub mod http;
pub mod store;

pub use api::AttendanceApi;
pub use error::ClientError;
pub use http::{ApiClient, FileTokenStore, MemoryTokenStore, TokenStore};
pub use store::{ClientState, JournalRow, Renderer, Store, Tab, View};
