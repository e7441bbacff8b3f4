use crate::convert::{convert, parse_url, split_and_trim};
use crate::error::{ConfigError, ConversionError};
use crate::expand::expand;
use crate::field::DEFAULT_SEPARATOR;
use crate::hook;
use crate::lookup::{Lookup, ProcessEnv};
use crate::value::FieldValue;
use std::net::IpAddr;
use std::time::Instant;
use url::Url;

/// Single-key typed reads over a [`Lookup`].
///
/// Values are expanded before use and trimmed before conversion.
#[derive(Debug, Clone, Default)]
pub struct Env<L = ProcessEnv> {
    lookup: L,
}

impl Env<ProcessEnv> {
    pub fn process() -> Self {
        Self { lookup: ProcessEnv }
    }
}

impl<L: Lookup> Env<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// The expanded value, or `None` when the key is absent
    pub fn raw(&self, key: &str) -> Option<String> {
        let start = Instant::now();
        let value = self.lookup.lookup(key).map(|v| expand(&v, &self.lookup));
        tracing::debug!(key, found = value.is_some(), "env read");
        hook::call_on_get(key, value.is_some(), start.elapsed());
        value
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    pub fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.raw(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })
    }

    /// # Panics
    /// When the key is absent.
    pub fn must(&self, key: &str) -> String {
        self.require(key).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Convert with a caller-supplied function
    pub fn typed<T, F>(&self, key: &str, conv: F) -> Result<T, ConfigError>
    where
        F: FnOnce(&str) -> Result<T, ConversionError>,
    {
        let raw = self.require(key)?;
        let text = raw.trim();
        conv(text).map_err(|e| ConfigError::from_conversion(key, text, e))
    }

    pub fn must_typed<T, F>(&self, key: &str, conv: F) -> T
    where
        F: FnOnce(&str) -> Result<T, ConversionError>,
    {
        self.typed(key, conv).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Convert with the same rules the binder uses; lists split on `,`
    pub fn parse<T: FieldValue>(&self, key: &str) -> Result<T, ConfigError> {
        self.typed(key, |text| {
            convert(&T::kind(), text, DEFAULT_SEPARATOR).and_then(T::from_value)
        })
    }

    /// Returns `default` when the key is absent or invalid
    pub fn parse_or<T: FieldValue>(&self, key: &str, default: T) -> T {
        self.parse(key).unwrap_or(default)
    }

    pub fn must_parse<T: FieldValue>(&self, key: &str) -> T {
        self.parse(key).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Split on `sep`; a present but blank value is an empty list
    pub fn list_sep(&self, key: &str, sep: &str) -> Result<Vec<String>, ConfigError> {
        self.typed(key, |text| Ok(split_and_trim(text, sep)))
    }

    pub fn url(&self, key: &str) -> Result<Url, ConfigError> {
        self.typed(key, parse_url)
    }

    pub fn ip(&self, key: &str) -> Result<IpAddr, ConfigError> {
        self.typed(key, |text| {
            text.parse()
                .map_err(|_| ConversionError::invalid("ip", text))
        })
    }
}

/// Expanded value of `key` in the process environment
pub fn get(key: &str) -> Option<String> {
    Env::process().raw(key)
}

pub fn get_or(key: &str, default: &str) -> String {
    Env::process().get_or(key, default)
}

pub fn require(key: &str) -> Result<String, ConfigError> {
    Env::process().require(key)
}

pub fn must_get(key: &str) -> String {
    Env::process().must(key)
}

/// Parse `key` from the process environment
pub fn parse<T: FieldValue>(key: &str) -> Result<T, ConfigError> {
    Env::process().parse(key)
}

pub fn parse_or<T: FieldValue>(key: &str, default: T) -> T {
    Env::process().parse_or(key, default)
}

pub fn must_parse<T: FieldValue>(key: &str) -> T {
    Env::process().must_parse(key)
}
