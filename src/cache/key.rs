//! Cache Key Module
//!
//! The store is keyed by rendered strings; everything above it (facade, ops
//! API) goes through `CacheKey`, rendered as `domain:resource[:qualifier]`.
//! `validate_prefix` guards prefix invalidation against over-matching.

use std::fmt;
use std::str::FromStr;

use crate::error::{CacheError, Result};

/// Separator between key segments.
pub const KEY_SEPARATOR: char = ':';

const RANGE_DOMAIN: &str = "range";

// == Cache Key ==
/// Namespaced cache key, e.g. `pex:clusters` or `receitas-mensais:ACME`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    domain: String,
    resource: String,
    qualifier: Option<String>,
}

impl CacheKey {
    /// Builds a two-segment key. Segments must be non-empty and must not
    /// contain the separator.
    pub fn new(domain: impl Into<String>, resource: impl Into<String>) -> Result<Self> {
        let domain = domain.into();
        let resource = resource.into();
        check_segment("domain", &domain)?;
        check_segment("resource", &resource)?;

        Ok(Self {
            domain,
            resource,
            qualifier: None,
        })
    }

    /// Adds the trailing qualifier (tenant, franchise, period...). The
    /// qualifier may itself contain separators.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Result<Self> {
        let qualifier = qualifier.into();
        if qualifier.is_empty() {
            return Err(CacheError::InvalidRequest(
                "Key qualifier cannot be empty".to_string(),
            ));
        }
        self.qualifier = Some(qualifier);
        Ok(self)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Prefix matching every key in `domain`, e.g. `"pex:"`.
    pub fn domain_prefix(domain: &str) -> String {
        format!("{}{}", domain, KEY_SEPARATOR)
    }

    /// Default key for a raw range read, `range:<range>`.
    ///
    /// A1 ranges carry the separator themselves (`Kpi!A:B`), so the part after
    /// the first one becomes the qualifier.
    pub fn for_range(range: &str) -> Result<Self> {
        format!("{}{}{}", RANGE_DOMAIN, KEY_SEPARATOR, range).parse()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.domain, KEY_SEPARATOR, self.resource)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{}{}", KEY_SEPARATOR, qualifier)?;
        }
        Ok(())
    }
}

impl FromStr for CacheKey {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, KEY_SEPARATOR);
        let domain = parts.next().unwrap_or_default();
        let resource = parts.next().ok_or_else(|| {
            CacheError::InvalidRequest(format!(
                "Key '{}' must have the form domain{sep}resource[{sep}qualifier]",
                s,
                sep = KEY_SEPARATOR
            ))
        })?;

        let key = CacheKey::new(domain, resource)?;
        match parts.next() {
            Some(qualifier) => key.with_qualifier(qualifier),
            None => Ok(key),
        }
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}

// == Prefix Validation ==
/// Accepts only non-empty prefixes ending in the separator, so `"pex:"` is
/// allowed but `"pex"` (which would also match `"pex2:..."`) is not.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Invalidation prefix cannot be empty".to_string(),
        ));
    }
    if !prefix.ends_with(KEY_SEPARATOR) {
        return Err(CacheError::InvalidRequest(format!(
            "Invalidation prefix '{}' must end with '{}'",
            prefix, KEY_SEPARATOR
        )));
    }
    Ok(())
}

fn check_segment(name: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(CacheError::InvalidRequest(format!(
            "Key {} cannot be empty",
            name
        )));
    }
    if segment.contains(KEY_SEPARATOR) {
        return Err(CacheError::InvalidRequest(format!(
            "Key {} '{}' cannot contain '{}'",
            name, segment, KEY_SEPARATOR
        )));
    }
    Ok(())
}
