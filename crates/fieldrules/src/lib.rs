//! # nebula-fieldrules
//!
//! Annotation-driven default values and rule validation for Nebula records.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nebula_fieldrules::prelude::*;
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     tags: Vec<String>,
//! }
//!
//! reflect_record! {
//!     Server {
//!         host => [default = "localhost", validate = "nonempty"],
//!         port => [default = "8080", validate = "min(1),max(65535)"],
//!         tags => [validate_elem = "nonempty,max(32)"],
//!     }
//! }
//!
//! let engine = Engine::new();
//! let mut server = Server::default();
//! engine.apply_defaults(&mut server)?;
//! engine.validate(&server)?;
//! ```
//!
//! ## Annotations
//!
//! - `default` - literal written into a zero field, or `dive` / `alloc` / `-`
//! - `default_elem` - literal written into zero elements, or `dive`
//! - `validate` - comma-separated rules such as `min(3),max(10)`
//! - `validate_elem` - rules for every element or map value, or `dive`
//! - `validate_key` - rules for every map key
//!
//! ## Rules
//!
//! Rules are looked up by name and by the runtime type of the field. Register
//! your own with [`Engine::register_rule`]; see [`rule`] for the dispatch
//! order and [`rule::BuiltinRules`] for what ships by default.

pub mod annotation;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod reflect;
pub mod rule;

pub use engine::{Engine, EngineBuilder, EngineConfig};
pub use error::{Error, ErrorKind, FieldError, ValidationErrors};
pub use reflect::{Record, Reflect};
pub use rule::{Rule, RuleRegistry};
pub use tokio_util::sync::CancellationToken;
