//! # Caller-side Helpers
//!
//! Everything a script needs around the registry and adapter but which is
//! not part of them: configuration, opt-in retry, and embedding math.
//!
//! ## Modules
//!
//! - [`config`]: Layered settings resolved into `ClientParams` per provider
//! - [`retry`]: Bounded random-exponential retry for vendor calls
//! - [`similarity`]: Cosine similarity over embedding vectors

pub mod config;
pub mod retry;
pub mod similarity;
