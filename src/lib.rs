//! Time zone conversion with live weather and currency context.
//!
//! The core is a [`core::session::Session`] owning the shared zone index and
//! the weather/currency services; a presentation layer drives it one action
//! at a time.

pub mod core;
pub mod shared;

pub use crate::core::features::zones::ZoneResolver;
pub use crate::core::session::{LiveSession, Session};
pub use crate::shared::error::{AppError, AppResult};
