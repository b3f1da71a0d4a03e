//! Ordered rules mapping asset identifiers to templates.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::error::EmitError;

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single `test -> template` rule.
#[derive(Clone)]
pub struct TemplateRule {
    test: Predicate,
    template: PathBuf,
}

impl TemplateRule {
    /// Create a rule from an arbitrary predicate over the asset identifier.
    pub fn new<F>(test: F, template: impl Into<PathBuf>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(test),
            template: template.into(),
        }
    }

    /// Create a rule that matches assets against a regular expression.
    pub fn regex(pattern: Regex, template: impl Into<PathBuf>) -> Self {
        Self::new(move |asset| pattern.is_match(asset), template)
    }

    /// Whether this rule applies to `asset`.
    pub fn matches(&self, asset: &str) -> bool {
        (self.test)(asset)
    }

    /// Template reference, as configured.
    pub fn template(&self) -> &Path {
        &self.template
    }
}

impl fmt::Debug for TemplateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRule")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

/// Find the template for `asset`. The first matching rule wins.
pub fn resolve<'a>(rules: &'a [TemplateRule], asset: &str) -> Result<&'a Path, EmitError> {
    rules
        .iter()
        .find(|rule| rule.matches(asset))
        .map(TemplateRule::template)
        .ok_or_else(|| EmitError::NoTemplateMatch {
            asset: asset.to_string(),
        })
}
