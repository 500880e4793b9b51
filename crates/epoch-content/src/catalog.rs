//! YAML event catalog.
//!
//! A catalog is a list of templates. Each template carries the event text
//! (with `{year}` placeholders), its options, and optional bounds on world
//! state metrics that must hold for the template to be eligible.
//!
//! ```yaml
//! templates:
//!   - id: ai-courts
//!     description: "In {year}, automated courts go live."
//!     when:
//!       publicTrust: { min: 40 }
//!     options:
//!       - option_id: A
//!         text: Endorse the rollout
//!         world_state_change: { publicTrust: 2 }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use epoch_core::model::{EventDescriptor, EventOption};
use epoch_core::world::WorldState;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read event catalog {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog is not valid YAML for the catalog schema.
    #[error("failed to parse event catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog parsed but its content is unusable.
    #[error("invalid event catalog: {0}")]
    Invalid(String),
}

/// Inclusive bounds on one metric. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricRange {
    /// Smallest allowed value.
    #[serde(default)]
    pub min: Option<i64>,
    /// Largest allowed value.
    #[serde(default)]
    pub max: Option<i64>,
}

impl MetricRange {
    /// Returns `true` if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// One authorable event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventTemplate {
    /// Catalog-unique identifier, used in logs.
    pub id: String,
    /// Event text. `{year}` is replaced with the turn year.
    pub description: String,
    /// Choices offered. `{year}` is replaced in option text too.
    pub options: Vec<EventOption>,
    /// Metric bounds the world state must satisfy. Metrics missing from the
    /// world state count as zero.
    #[serde(default)]
    pub when: BTreeMap<String, MetricRange>,
}

impl EventTemplate {
    /// Returns `true` if every bound in `when` holds for `world_state`.
    #[must_use]
    pub fn is_eligible(&self, world_state: &WorldState) -> bool {
        self.when
            .iter()
            .all(|(metric, range)| range.contains(world_state.get(metric).unwrap_or(0)))
    }

    /// Renders the template as the event for `year`.
    #[must_use]
    pub fn render(&self, year: i64) -> EventDescriptor {
        let year_text = year.to_string();
        EventDescriptor {
            year,
            description: self.description.replace("{year}", &year_text),
            options: self
                .options
                .iter()
                .map(|option| EventOption {
                    text: option.text.replace("{year}", &year_text),
                    ..option.clone()
                })
                .collect(),
        }
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::Invalid("template id must not be empty".to_owned()));
        }
        self.render(1)
            .validate()
            .map_err(|e| CatalogError::Invalid(format!("template {}: {e}", self.id)))?;
        for (metric, range) in &self.when {
            if matches!((range.min, range.max), (Some(min), Some(max)) if min > max) {
                return Err(CatalogError::Invalid(format!(
                    "template {}: {metric} has inverted bounds",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// A validated set of event templates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventCatalog {
    /// Templates in authoring order.
    pub templates: Vec<EventTemplate>,
}

impl EventCatalog {
    /// Parses and validates a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML and
    /// `CatalogError::Invalid` for an empty catalog, duplicate template IDs,
    /// or a template that would render an invalid event.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        if catalog.templates.is_empty() {
            return Err(CatalogError::Invalid(
                "catalog must contain at least one template".to_owned(),
            ));
        }
        let mut ids = HashSet::with_capacity(catalog.templates.len());
        for template in &catalog.templates {
            template.check()?;
            if !ids.insert(template.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate template id: {}",
                    template.id
                )));
            }
        }
        Ok(catalog)
    }

    /// Reads and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise as
    /// [`EventCatalog::from_yaml_str`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Templates eligible for `world_state`, in authoring order.
    pub fn eligible<'a>(
        &'a self,
        world_state: &'a WorldState,
    ) -> impl Iterator<Item = &'a EventTemplate> + 'a {
        self.templates
            .iter()
            .filter(move |template| template.is_eligible(world_state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../../content/events.yaml");

    fn catalog(yaml: &str) -> Result<EventCatalog, CatalogError> {
        EventCatalog::from_yaml_str(yaml)
    }

    #[test]
    fn test_shipped_catalog_is_valid() {
        let catalog = catalog(SAMPLE).unwrap();

        assert!(catalog.templates.len() >= 3);
        let baseline = WorldState::from_iter([
            ("publicTrust", 50),
            ("socialCohesion", 50),
            ("techRegulation", 30),
        ]);
        assert!(catalog.eligible(&baseline).next().is_some());
    }

    #[test]
    fn test_render_substitutes_year() {
        // Arrange
        let catalog = catalog(
            r"
templates:
  - id: census
    description: The {year} census is published.
    options:
      - option_id: A
        text: Publish the {year} figures
        world_state_change: { publicTrust: 1 }
",
        )
        .unwrap();

        // Act
        let event = catalog.templates[0].render(2080);

        // Assert
        assert_eq!(event.year, 2080);
        assert_eq!(event.description, "The 2080 census is published.");
        assert_eq!(event.options[0].text, "Publish the 2080 figures");
        assert_eq!(event.options[0].world_state_change.get("publicTrust"), Some(1));
    }

    #[test]
    fn test_when_bounds_filter_templates() {
        // Arrange
        let catalog = catalog(
            r"
templates:
  - id: unrest
    description: Protests in {year}.
    when:
      publicTrust: { max: 30 }
    options:
      - { option_id: A, text: Negotiate }
  - id: boom
    description: Boom in {year}.
    when:
      publicTrust: { min: 31 }
      automation: { min: 0, max: 10 }
    options:
      - { option_id: A, text: Invest }
",
        )
        .unwrap();
        let low_trust = WorldState::from_iter([("publicTrust", 20)]);
        let high_trust = WorldState::from_iter([("publicTrust", 70)]);

        // Act
        let low: Vec<_> = catalog.eligible(&low_trust).map(|t| t.id.as_str()).collect();
        let high: Vec<_> = catalog.eligible(&high_trust).map(|t| t.id.as_str()).collect();

        // Assert
        assert_eq!(low, vec!["unrest"]);
        assert_eq!(high, vec!["boom"]);
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let result = catalog("templates: []");

        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_duplicate_template_ids_are_rejected() {
        let result = catalog(
            r"
templates:
  - { id: same, description: One, options: [{ option_id: A, text: a }] }
  - { id: same, description: Two, options: [{ option_id: A, text: a }] }
",
        );

        match result.unwrap_err() {
            CatalogError::Invalid(msg) => assert!(msg.contains("duplicate template id")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_template_with_duplicate_options_is_rejected() {
        let result = catalog(
            r"
templates:
  - id: twice
    description: Twice
    options:
      - { option_id: A, text: a }
      - { option_id: A, text: b }
",
        );

        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let result = catalog(
            r"
templates:
  - id: inverted
    description: Inverted
    when: { publicTrust: { min: 10, max: 5 } }
    options: [{ option_id: A, text: a }]
",
        );

        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_unknown_fields_fail_to_parse() {
        let result = catalog(
            r"
templates:
  - id: typo
    description: Typo
    optoins: []
",
        );

        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let result = EventCatalog::load(Path::new("/nonexistent/epoch/events.yaml"));

        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
