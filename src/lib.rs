//! Bind environment variables onto typed struct fields.
//!
//! Fields are tagged with attributes, and `#[derive(Bind)]` turns the tags
//! into a binding routine. Binding reports every failing field at once:
//!
//! ```rust
//! use envbind::Bind;
//! use std::collections::HashMap;
//!
//! #[derive(Bind, Default)]
//! struct Server {
//!     #[env = "PORT,required"]
//!     #[validate = "min=1,max=65535"]
//!     port: u16,
//!     #[env = "HOSTS"]
//!     #[envdef = "a.local;b.local"]
//!     #[envsep = ";"]
//!     hosts: Vec<String>,
//! }
//!
//! let env = HashMap::from([("PORT".to_string(), "8080".to_string())]);
//! let mut server = Server::default();
//! envbind::bind_from(&mut server, &env, None).unwrap();
//!
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.hosts, ["a.local", "b.local"]);
//! ```
//!
//! Besides struct binding the crate offers single-key getters ([`Env`],
//! [`get`], [`parse`]), once-only [`LazyVar`]s, `.env` loading ([`load_once`])
//! and a redacted environment dump ([`dump_redacted`]).

extern crate self as envbind;

pub mod binder;
pub mod convert;
pub mod env;
pub mod error;
pub mod expand;
pub mod field;
pub mod hook;
pub mod lazy;
pub mod load;
pub mod lookup;
pub mod redact;
pub mod validate;
pub mod value;

pub use binder::{
    bind, bind_from, bind_with_prefix, must_bind, must_bind_with_prefix, Bind, Binder,
};
pub use env::{get, get_or, must_get, must_parse, parse, parse_or, require, Env};
pub use error::{format_config_errors, BindError, ConfigError, ConversionError, LoadError};
pub use expand::{expand, expand_map};
pub use field::{FieldDescriptor, FieldKind, DEFAULT_SEPARATOR};
pub use hook::{clear_hook, set_hook, Hook};
pub use lazy::LazyVar;
pub use load::{
    load_from_path, load_once, must_load_once, parse_env_file, read_file, set_env_vars,
    DEFAULT_PATHS,
};
pub use lookup::{Lookup, ProcessEnv};
pub use redact::{dump_redacted, is_secret_key, redact};
pub use validate::{validate_value, Rule, ValidationError};
pub use value::{FieldValue, Value};

// Derive macro, same name as the trait it implements
pub use envbind_macros::Bind;

pub use url::Url;
