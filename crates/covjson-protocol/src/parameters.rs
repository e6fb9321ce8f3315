//! Parameter definitions of a collection's `parameters` block.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A data variable carried in the ranges of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    /// Always "Parameter".
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<I18nString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,

    #[serde(rename = "observedProperty")]
    pub observed_property: ObservedProperty,
}

impl Parameter {
    /// Parameter identified by `id` (the range name) with an English label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            type_: "Parameter".to_string(),
            description: None,
            unit: None,
            observed_property: ObservedProperty {
                id: Some(id.into()),
                label: Some(I18nString::english(label)),
                description: None,
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(I18nString::english(description));
        self
    }

    /// Attach a unit given only by its symbol (`K`, `m s**-1`, ...).
    pub fn with_unit_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.unit = Some(Unit {
            label: None,
            symbol: Some(UnitSymbol::Simple(symbol.into())),
        });
        self
    }

    pub fn unit_symbol(&self) -> Option<&str> {
        self.unit.as_ref()?.symbol.as_ref().map(UnitSymbol::value)
    }

    /// Short name from the observed property, if present.
    pub fn id(&self) -> Option<&str> {
        self.observed_property.id.as_deref()
    }
}

/// Text either as a plain string or keyed by language code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum I18nString {
    Simple(String),
    Localized(BTreeMap<String, String>),
}

impl I18nString {
    pub fn english(text: impl Into<String>) -> Self {
        I18nString::Localized(BTreeMap::from([("en".to_string(), text.into())]))
    }

    /// English text, else the first language present.
    pub fn text(&self) -> &str {
        match self {
            I18nString::Simple(s) => s,
            I18nString::Localized(map) => map
                .get("en")
                .or_else(|| map.values().next())
                .map_or("", String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObservedProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<I18nString>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<UnitSymbol>,
}

/// Unit symbol, plain or with its vocabulary type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UnitSymbol {
    Simple(String),
    Structured {
        value: String,
        #[serde(rename = "type")]
        type_: Option<String>,
    },
}

impl UnitSymbol {
    pub fn value(&self) -> &str {
        match self {
            UnitSymbol::Simple(s) => s,
            UnitSymbol::Structured { value, .. } => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parameter() {
        let param = Parameter::new("2t", "2 metre temperature").with_unit_symbol("K");
        assert_eq!(param.type_, "Parameter");
        assert_eq!(param.id(), Some("2t"));
        assert_eq!(param.unit_symbol(), Some("K"));
        assert_eq!(
            param.observed_property.label.as_ref().map(I18nString::text),
            Some("2 metre temperature")
        );
    }

    #[test]
    fn test_serialized_layout() {
        let param = Parameter::new("tp", "Total precipitation")
            .with_description("Accumulated liquid and frozen water")
            .with_unit_symbol("m");
        let json = serde_json::to_value(&param).unwrap();

        assert_eq!(json["unit"], serde_json::json!({"symbol": "m"}));
        assert_eq!(json["observedProperty"]["label"]["en"], "Total precipitation");
        assert_eq!(json["description"]["en"], "Accumulated liquid and frozen water");
    }

    #[test]
    fn test_parse_upstream_parameter() {
        let json = r#"{
            "type": "Parameter",
            "description": {"en": "2 metre temperature"},
            "unit": {"symbol": "K"},
            "observedProperty": {"id": "2t", "label": {"en": "2 metre temperature"}}
        }"#;
        let param: Parameter = serde_json::from_str(json).unwrap();
        assert_eq!(param.unit_symbol(), Some("K"));
        assert_eq!(param.id(), Some("2t"));
        assert_eq!(param.description.unwrap().text(), "2 metre temperature");
    }

    #[test]
    fn test_text_falls_back_to_other_language() {
        let map = BTreeMap::from([("fr".to_string(), "Température".to_string())]);
        assert_eq!(I18nString::Localized(map).text(), "Température");
        assert_eq!(I18nString::Simple("t".to_string()).text(), "t");
        assert_eq!(I18nString::Localized(BTreeMap::new()).text(), "");
    }

    #[test]
    fn test_structured_unit_symbol() {
        let json = r#"{"symbol":{"value":"K","type":"http://www.opengis.net/def/uom/UCUM/"}}"#;
        let unit: Unit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.symbol.unwrap().value(), "K");
    }
}
