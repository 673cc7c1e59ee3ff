//! Sync run configuration.

use crate::entity::EntityType;
use crate::error::Error;
use crate::store::Scope;

/// Configuration for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Dataset namespace; prefixes every table name.
    pub scope: String,

    /// Reconcile countries.
    pub enable_countries: bool,

    /// Reconcile states and provinces. Requires countries.
    pub enable_state_provinces: bool,

    /// Reconcile cities. Requires states and provinces.
    pub enable_cities: bool,
}

impl SyncConfig {
    /// Create a configuration for `scope` with every entity type enabled.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            enable_countries: true,
            enable_state_provinces: true,
            enable_cities: true,
        }
    }

    /// Enable or disable countries.
    pub fn with_countries(mut self, enabled: bool) -> Self {
        self.enable_countries = enabled;
        self
    }

    /// Enable or disable states and provinces.
    pub fn with_state_provinces(mut self, enabled: bool) -> Self {
        self.enable_state_provinces = enabled;
        self
    }

    /// Enable or disable cities.
    pub fn with_cities(mut self, enabled: bool) -> Self {
        self.enable_cities = enabled;
        self
    }

    /// Check if an entity type is enabled.
    pub fn is_enabled(&self, entity: EntityType) -> bool {
        match entity {
            EntityType::Country => self.enable_countries,
            EntityType::StateProvince => self.enable_state_provinces,
            EntityType::City => self.enable_cities,
        }
    }

    /// Validate the configuration and return the run scope.
    ///
    /// A child entity type can only be enabled together with its parent.
    pub fn validate(&self) -> Result<Scope, Error> {
        let scope = Scope::new(self.scope.as_str())?;

        for entity in EntityType::ALL {
            if let Some(parent) = entity.parent() {
                if self.is_enabled(entity) && !self.is_enabled(parent) {
                    return Err(Error::Config(format!(
                        "{entity} requires {parent} to be enabled"
                    )));
                }
            }
        }

        Ok(scope)
    }

    /// Enabled entity types, parents before children.
    pub fn enabled_entities(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|entity| self.is_enabled(*entity))
            .collect()
    }
}
