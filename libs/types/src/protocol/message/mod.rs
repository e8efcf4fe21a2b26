//! # Envelope Structure Definitions
//!
//! ## Purpose
//!
//! Defines the fixed leading structure of every signal envelope. The prelude
//! is the only statically sized region of the frame; everything after it (the
//! header-field array and the body) is dynamically marshalled.
//!
//! ## Architecture Role
//!
//! ```text
//! Application Layer → [Envelope Prelude] → Transport Layer
//!                          ↓
//!     ┌──────────────────────────────────────────────┐
//!     │ body_len (4) │ serial (4) │ header fields ...│
//!     ├──────────────────────────────────────────────┤
//!     │ padding to 8 │ body bytes (= body_len)       │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! `body_len` is reserved before any header bytes are emitted and backpatched
//! once the body is fully encoded; it is the only byte range revisited after
//! initial emission.

pub mod prelude;

pub use prelude::*;
