use crate::convert::convert;
use crate::env::Env;
use crate::error::{ConfigError, ConversionError};
use crate::field::DEFAULT_SEPARATOR;
use crate::lookup::{Lookup, ProcessEnv};
use crate::value::FieldValue;
use once_cell::sync::OnceCell;
use std::fmt;

type Converter<T> = Box<dyn Fn(&str) -> Result<T, ConversionError> + Send + Sync>;

/// A value read from the environment at most once.
///
/// The first successful read is cached; later environment changes are not
/// observed. Concurrent first callers block until a single read completes.
pub struct LazyVar<T, L = ProcessEnv> {
    key: String,
    env: Env<L>,
    conv: Converter<T>,
    cell: OnceCell<T>,
}

impl<T> LazyVar<T, ProcessEnv> {
    pub fn new<F>(key: impl Into<String>, conv: F) -> Self
    where
        F: Fn(&str) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        Self::with_lookup(key, ProcessEnv, conv)
    }
}

impl<T: FieldValue + 'static> LazyVar<T, ProcessEnv> {
    /// Convert with the binder's rules for `T`
    pub fn parsed(key: impl Into<String>) -> Self {
        Self::new(key, parse_as::<T>)
    }
}

fn parse_as<T: FieldValue>(text: &str) -> Result<T, ConversionError> {
    convert(&T::kind(), text, DEFAULT_SEPARATOR).and_then(T::from_value)
}

impl<T, L: Lookup> LazyVar<T, L> {
    pub fn with_lookup<F>(key: impl Into<String>, lookup: L, conv: F) -> Self
    where
        F: Fn(&str) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            env: Env::new(lookup),
            conv: Box::new(conv),
            cell: OnceCell::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The cached value, resolving it first if needed. A failure is returned
    /// and not cached.
    pub fn try_get(&self) -> Result<&T, ConfigError> {
        self.cell
            .get_or_try_init(|| self.env.typed(&self.key, |text| (self.conv)(text)))
    }

    /// # Panics
    /// When the key is missing or its value does not convert.
    pub fn get(&self) -> &T {
        self.try_get().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug, L> fmt::Debug for LazyVar<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyVar")
            .field("key", &self.key)
            .field("value", &self.cell.get())
            .finish()
    }
}
