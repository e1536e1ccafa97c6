use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::default::DefaultMatcher;
use super::matcher::Matcher;

/// Reserved feed type of the fallback matcher.
pub const DEFAULT_FEED_TYPE: &str = "default";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Matcher already registered for feed type '{0}'")]
    Duplicate(String),
}

/// Collects matchers during startup and rejects duplicate feed types.
///
/// A default matcher is always present, so a built [`Registry`] can resolve
/// every feed type.
pub struct RegistryBuilder {
    default: Arc<dyn Matcher>,
    matchers: HashMap<String, Arc<dyn Matcher>>,
}

impl RegistryBuilder {
    /// Starts a registry whose fallback is [`DefaultMatcher`].
    pub fn new() -> Self {
        Self::with_default(DefaultMatcher)
    }

    /// Starts a registry with a custom fallback matcher.
    pub fn with_default<M: Matcher + 'static>(matcher: M) -> Self {
        tracing::info!(feed_type = DEFAULT_FEED_TYPE, "Registered matcher");
        Self {
            default: Arc::new(matcher),
            matchers: HashMap::new(),
        }
    }

    /// Registers `matcher` for `feed_type`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Duplicate`] if the feed type (including the reserved
    /// [`DEFAULT_FEED_TYPE`]) already has a matcher.
    pub fn register<M: Matcher + 'static>(
        mut self,
        feed_type: impl Into<String>,
        matcher: M,
    ) -> Result<Self, RegistryError> {
        let feed_type = feed_type.into();
        if feed_type == DEFAULT_FEED_TYPE || self.matchers.contains_key(&feed_type) {
            return Err(RegistryError::Duplicate(feed_type));
        }

        tracing::info!(feed_type = %feed_type, "Registered matcher");
        self.matchers.insert(feed_type, Arc::new(matcher));
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            default: self.default,
            matchers: self.matchers,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only mapping from feed type to matcher, shared by all workers of a
/// run.
pub struct Registry {
    default: Arc<dyn Matcher>,
    matchers: HashMap<String, Arc<dyn Matcher>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the matcher registered for `feed_type`, or the default
    /// matcher when there is none.
    pub fn lookup(&self, feed_type: &str) -> Arc<dyn Matcher> {
        match self.matchers.get(feed_type) {
            Some(matcher) => Arc::clone(matcher),
            None => Arc::clone(&self.default),
        }
    }

    /// Registered feed types, sorted, excluding the default.
    pub fn feed_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.matchers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("feed_types", &self.feed_types())
            .finish_non_exhaustive()
    }
}
