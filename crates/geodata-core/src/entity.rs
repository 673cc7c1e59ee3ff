//! Entity types and their reconciliation descriptors.

use std::fmt;

use geodata_proto::{Record, FIELD_CREATE_DATE, FIELD_ID, FIELD_MODIFY_DATE};
use serde::Serialize;

use crate::error::Error;

/// The reference entity types, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    /// ISO 3166-1 country.
    Country,
    /// ISO 3166-2 subdivision; references a country by `countryAlpha2`.
    StateProvince,
    /// City; references a state/province by `countryAlpha2` + `stateCode`.
    City,
}

impl EntityType {
    /// All entity types, parents before children.
    pub const ALL: [EntityType; 3] = [
        EntityType::Country,
        EntityType::StateProvince,
        EntityType::City,
    ];

    /// Unprefixed table name.
    pub fn table_name(self) -> &'static str {
        match self {
            EntityType::Country => "country",
            EntityType::StateProvince => "stateProvince",
            EntityType::City => "city",
        }
    }

    /// The entity this one references, if any.
    pub fn parent(self) -> Option<EntityType> {
        match self {
            EntityType::Country => None,
            EntityType::StateProvince => Some(EntityType::Country),
            EntityType::City => Some(EntityType::StateProvince),
        }
    }

    /// Natural-key fields for this entity type.
    pub fn key_fields(self) -> &'static [&'static str] {
        match self {
            EntityType::Country => &["alpha2Code"],
            EntityType::StateProvince => &["countryAlpha2", "code"],
            EntityType::City => &["countryAlpha2", "stateCode", "name"],
        }
    }

    /// The built-in descriptor for this entity type.
    pub fn descriptor(self) -> EntityDescriptor {
        EntityDescriptor::new(self).with_key_fields(self.key_fields().iter().copied())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Describes how one entity type is reconciled.
///
/// The reconciler is written once against this descriptor instead of once
/// per entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Entity type this descriptor belongs to.
    pub entity: EntityType,
    /// Ordered natural-key fields. Reordering changes the key space.
    pub key_fields: Vec<String>,
    /// Fields that never take part in change detection.
    pub exempt_fields: Vec<String>,
}

impl EntityDescriptor {
    /// Create a descriptor with no key fields and the standard exempt fields.
    pub fn new(entity: EntityType) -> Self {
        Self {
            entity,
            key_fields: Vec::new(),
            exempt_fields: vec![
                FIELD_ID.to_string(),
                FIELD_CREATE_DATE.to_string(),
                FIELD_MODIFY_DATE.to_string(),
            ],
        }
    }

    /// Set the natural-key fields.
    pub fn with_key_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.key_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Add an exempt field.
    pub fn with_exempt_field(mut self, field: impl Into<String>) -> Self {
        self.exempt_fields.push(field.into());
        self
    }

    /// Check if a field is exempt from change detection.
    pub fn is_exempt(&self, field: &str) -> bool {
        self.exempt_fields.iter().any(|f| f == field)
    }

    /// Surrogate identifier of a record of this type.
    pub fn identifier(&self, record: &Record) -> Option<i64> {
        record.id()
    }

    /// Reject descriptors that cannot build a natural key.
    pub fn validate(&self) -> Result<(), Error> {
        if self.key_fields.is_empty() {
            return Err(Error::Config(format!(
                "natural key fields are required for {}",
                self.entity
            )));
        }
        if let Some(blank) = self.key_fields.iter().find(|f| f.trim().is_empty()) {
            return Err(Error::Config(format!(
                "blank natural key field {blank:?} for {}",
                self.entity
            )));
        }
        if let Some(exempt) = self.key_fields.iter().find(|f| self.is_exempt(f)) {
            return Err(Error::Config(format!(
                "natural key field {exempt} of {} is exempt from comparison",
                self.entity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_order() {
        assert_eq!(EntityType::ALL[0].parent(), None);
        for pair in EntityType::ALL.windows(2) {
            assert_eq!(pair[1].parent(), Some(pair[0]));
        }
    }

    #[test]
    fn test_builtin_descriptors_are_valid() {
        for entity in EntityType::ALL {
            let descriptor = entity.descriptor();
            descriptor.validate().unwrap();
            assert!(descriptor.is_exempt("id"));
            assert!(descriptor.is_exempt("modifyDate"));
            assert!(!descriptor.is_exempt("name"));
        }
        assert_eq!(
            EntityType::City.descriptor().key_fields,
            vec!["countryAlpha2", "stateCode", "name"]
        );
    }

    #[test]
    fn test_missing_key_fields_is_config_error() {
        let err = EntityDescriptor::new(EntityType::Country).validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("natural key fields are required"));

        let err = EntityDescriptor::new(EntityType::Country)
            .with_key_fields(["alpha2Code", " "])
            .validate()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_exempt_key_field_rejected() {
        let err = EntityDescriptor::new(EntityType::City)
            .with_key_fields(["id"])
            .validate()
            .unwrap_err();
        assert!(err.is_config());

        let descriptor = EntityType::Country.descriptor().with_exempt_field("alpha2Code");
        assert!(descriptor.is_exempt("alpha2Code"));
        assert!(descriptor.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&EntityType::StateProvince).unwrap(),
            "\"stateProvince\""
        );
        assert_eq!(EntityType::City.to_string(), "city");
    }
}
