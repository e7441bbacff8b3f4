//! Binding environment values onto struct fields.
//!
//! [`Binder`] walks a struct's field descriptors one at a time, collecting
//! every failure instead of stopping at the first. `#[derive(Bind)]` generates
//! the walk; the same calls can be written by hand.
//!
//! # Example
//! ```rust
//! use envbind::{Binder, FieldDescriptor};
//! use std::collections::HashMap;
//!
//! let env = HashMap::from([("PORT".to_string(), "8080".to_string())]);
//! let mut port: u16 = 0;
//!
//! let mut binder = Binder::new(&env);
//! binder.field(&mut port, &FieldDescriptor::new("PORT").required().rule("min=1"));
//! binder.finish().unwrap();
//!
//! assert_eq!(port, 8080);
//! ```

use crate::convert::{convert, decode_json};
use crate::error::{format_config_errors, BindError, ConfigError};
use crate::expand::expand;
use crate::field::FieldDescriptor;
use crate::lookup::{Lookup, ProcessEnv};
use crate::validate::validate_value;
use crate::value::FieldValue;
use serde::de::DeserializeOwned;

/// A struct whose tagged fields can be bound from an environment
pub trait Bind {
    /// Descriptors of the tagged fields, in declaration order
    fn descriptors() -> Vec<FieldDescriptor>;

    /// Resolve, convert and validate every tagged field through `binder`
    fn bind_fields<L: Lookup + ?Sized>(&mut self, binder: &mut Binder<'_, L>);

    /// Bind a default instance from the process environment
    fn load_or_error() -> Result<Self, BindError>
    where
        Self: Default + Sized,
    {
        let mut config = Self::default();
        bind(&mut config)?;
        Ok(config)
    }

    /// Bind a default instance from the process environment, panicking on errors
    fn load() -> Self
    where
        Self: Default + Sized,
    {
        match Self::load_or_error() {
            Ok(config) => config,
            Err(err) => panic!("{}", err),
        }
    }
}

/// Where a field's raw text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Environment,
    Default,
}

/// Collects per-field failures while binding
pub struct Binder<'a, L: Lookup + ?Sized> {
    lookup: &'a L,
    prefix: Option<&'a str>,
    errors: Vec<ConfigError>,
}

impl<'a, L: Lookup + ?Sized> Binder<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            prefix: None,
            errors: Vec::new(),
        }
    }

    /// Look up `prefix + key` before `key`
    pub fn with_prefix(mut self, prefix: &'a str) -> Self {
        self.prefix = Some(prefix).filter(|p| !p.is_empty());
        self
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix
    }

    /// Find the raw text for `descriptor`, recording a failure when a required
    /// value is missing. The text is expanded before it is returned.
    fn resolve(&mut self, descriptor: &FieldDescriptor) -> Option<String> {
        let (raw, origin) = match self.lookup.lookup_prefixed(self.prefix, descriptor.key) {
            Some(raw) => (raw, Origin::Environment),
            None => match descriptor.default_text() {
                Some(default) => (default.to_string(), Origin::Default),
                None if descriptor.required => {
                    self.errors.push(ConfigError::Missing {
                        key: descriptor.key.to_string(),
                    });
                    return None;
                }
                None => return None,
            },
        };

        let from_default = origin == Origin::Default;
        tracing::debug!(
            key = descriptor.key,
            field = descriptor.field,
            from_default,
            "resolved field"
        );
        Some(expand(&raw, self.lookup))
    }

    fn check_rule<T: FieldValue>(&mut self, slot: &T, descriptor: &FieldDescriptor) {
        let Some(rule) = descriptor.rule_text() else {
            return;
        };
        let Some(value) = slot.to_value() else {
            return;
        };
        if let Err(source) = validate_value(&value, rule) {
            self.errors.push(ConfigError::ValidationViolation {
                key: descriptor.key.to_string(),
                source,
            });
        }
    }

    /// Bind one field by primitive conversion of its type.
    ///
    /// JSON descriptors go through [`Binder::json`] or [`Binder::json_checked`];
    /// passing one here is a debug assertion failure.
    pub fn field<T: FieldValue>(&mut self, slot: &mut T, descriptor: &FieldDescriptor) {
        debug_assert!(
            !descriptor.json,
            "{}: JSON descriptors must be bound with Binder::json or Binder::json_checked",
            descriptor.key
        );
        let Some(raw) = self.resolve(descriptor) else {
            return;
        };

        let converted = convert(&T::kind(), &raw, descriptor.separator_text())
            .and_then(T::from_value);
        match converted {
            Ok(value) => *slot = value,
            Err(err) => {
                self.errors
                    .push(ConfigError::from_conversion(descriptor.key, &raw, err));
                return;
            }
        }

        self.check_rule(slot, descriptor);
    }

    fn decode_into<T: DeserializeOwned>(&mut self, slot: &mut T, descriptor: &FieldDescriptor) -> bool {
        let Some(raw) = self.resolve(descriptor) else {
            return false;
        };

        match decode_json(&raw) {
            Ok(value) => {
                *slot = value;
                true
            }
            Err(err) => {
                self.errors
                    .push(ConfigError::from_conversion(descriptor.key, &raw, err));
                false
            }
        }
    }

    /// Bind one field by decoding its raw text as JSON.
    ///
    /// Any declared rule is ignored; use [`Binder::json_checked`] when the
    /// decoded value must be validated.
    pub fn json<T: DeserializeOwned>(&mut self, slot: &mut T, descriptor: &FieldDescriptor) {
        self.decode_into(slot, descriptor);
    }

    /// Like [`Binder::json`], then applies the declared rule to the decoded value
    pub fn json_checked<T>(&mut self, slot: &mut T, descriptor: &FieldDescriptor)
    where
        T: DeserializeOwned + FieldValue,
    {
        if self.decode_into(slot, descriptor) {
            self.check_rule(slot, descriptor);
        }
    }

    /// Failures collected so far
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Finish binding and return the aggregated failures, if any
    pub fn finish(self) -> Result<(), BindError> {
        match BindError::from_errors(self.errors) {
            None => Ok(()),
            Some(err) => {
                tracing::warn!(failures = err.len(), "binding failed");
                Err(err)
            }
        }
    }

    /// Finish binding and panic if there were any failures
    pub fn finish_or_panic(self) {
        if !self.errors.is_empty() {
            panic!("{}", format_config_errors(&self.errors));
        }
    }
}

/// Bind `dst` from the process environment
pub fn bind<T: Bind>(dst: &mut T) -> Result<(), BindError> {
    bind_from(dst, &ProcessEnv, None)
}

/// Bind `dst` from the process environment, preferring `prefix + key`
pub fn bind_with_prefix<T: Bind>(dst: &mut T, prefix: &str) -> Result<(), BindError> {
    bind_from(dst, &ProcessEnv, Some(prefix))
}

/// Bind `dst` from an arbitrary lookup
pub fn bind_from<T: Bind, L: Lookup + ?Sized>(
    dst: &mut T,
    lookup: &L,
    prefix: Option<&str>,
) -> Result<(), BindError> {
    let mut binder = Binder::new(lookup);
    if let Some(prefix) = prefix {
        binder = binder.with_prefix(prefix);
    }
    dst.bind_fields(&mut binder);
    binder.finish()
}

/// Like [`bind`], panicking on errors
pub fn must_bind<T: Bind>(dst: &mut T) {
    if let Err(err) = bind(dst) {
        panic!("{}", err);
    }
}

/// Like [`bind_with_prefix`], panicking on errors
pub fn must_bind_with_prefix<T: Bind>(dst: &mut T, prefix: &str) {
    if let Err(err) = bind_with_prefix(dst, prefix) {
        panic!("{}", err);
    }
}
