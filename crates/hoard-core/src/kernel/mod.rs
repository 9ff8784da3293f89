//! # Hoard Core Kernel
//!
//! Lifecycle and shared plumbing of the engine.
//!
//! - [`Application`](bootstrap::Application): builds the provider, config,
//!   persistence queue and registry over one data directory, and drives them
//!   through initialize, start and shutdown.
//! - [`KernelComponent`](component::KernelComponent): the async lifecycle
//!   trait, with [`DependencyRegistry`](component::DependencyRegistry) for
//!   type-keyed lookup.
//! - [`constants`]: defaults and well-known names.
//! - [`Error`](error::Error) and the crate-wide [`Result`](error::Result).
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use component::{DependencyRegistry, KernelComponent};
pub use error::{Error, KernelLifecyclePhase, Result};
