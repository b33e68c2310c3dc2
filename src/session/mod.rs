//! Session layer for gw-search.
//!
//! The [`SessionService`] trait is the boundary to the analytics server.
//! [`HttpSession`] implements it over the server's JSON API.

pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpSession;
pub use traits::{SessionResult, SessionService};
pub use types::{ParsedQuery, SearchHandle, SearchState, StatusResponse};
