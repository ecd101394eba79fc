//! Property module - named metadata values attached to units and sentences

use crate::structure::MetadataRule;
use serde::{Deserialize, Serialize};

/// A single metadata value extracted from the markup
///
/// Properties are immutable once created. The rule that produced the value
/// travels with it so stored records can be traced back to the structure
/// specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Extracted value (attribute token or element text)
    pub value: String,

    /// Property name, taken from the rule's `propertyName`
    pub name: String,

    /// The metadata rule this value was extracted by
    pub specification: MetadataRule,
}

impl Property {
    /// Create a property for `value`, named after `rule`
    pub fn from_rule(value: impl Into<String>, rule: &MetadataRule) -> Self {
        Self {
            value: value.into(),
            name: rule.property_name.clone(),
            specification: rule.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rule_copies_name_and_rule() {
        let rule = MetadataRule {
            xpaths: vec!["@who".to_string()],
            attr: None,
            property_name: "speaker".to_string(),
        };

        let property = Property::from_rule("Hamlet", &rule);
        assert_eq!(property.value, "Hamlet");
        assert_eq!(property.name, "speaker");
        assert_eq!(property.specification, rule);
    }
}
