//! Test doubles for the persistence seams.
//!
//! These are compiled into the library so that the server crate's
//! integration tests can inject them as well.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk_core::testing::{MockRepository, RecordingAdapter};
//!
//! let repo = MockRepository::new();
//! repo.fail_next_fetch(RemoteError::Unauthorized("expired".into())).await;
//!
//! let adapter = RecordingAdapter::new();
//! // ... drive a session ...
//! assert_eq!(adapter.save_count(), 1);
//! ```

mod mock_repository;
mod recording_adapter;

pub use mock_repository::{MockRepository, RecordedWrite};
pub use recording_adapter::RecordingAdapter;
