//! Common utilities and shared types for fedimoji.
//!
//! This crate provides the pieces shared by every fedimoji crate:
//!
//! - **Configuration**: settings loaded from files and the environment via [`Config`]
//! - **Error handling**: the normalized error taxonomy [`AppError`] and [`AppResult`]
//! - **Execution context**: per-call deadlines and cancellation via [`Context`]
//! - **ID Generation**: ULID-based identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use fedimoji_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let ctx = config.default_context();
//!     let id = IdGenerator::new().generate();
//!     println!("{id} deadline={:?}", ctx.deadline());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod id;

pub use config::{Config, DatabaseConfig, RepositoryConfig};
pub use context::{CancelHandle, Context};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
