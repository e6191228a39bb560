use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A business rule from the closed rule vocabulary.
///
/// Records are tagged by their `type` field. Rules contribute to the
/// constraint score only; they never gate feasibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Listed hours must be served at `location`, and at least `min_hours`
    /// hours in total when given.
    RequiredLocationHours {
        location: String,
        #[serde(default)]
        hours: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_hours: Option<usize>,
    },

    /// Price cap for `item`, or for every menu item when `item` is absent.
    MaxPrice {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<String>,
        #[serde(alias = "value")]
        limit: f64,
    },

    /// `item` may not be offered while any of `hours` is served.
    ForbiddenItemHours { item: String, hours: Vec<String> },

    /// While any of `hours` is served, every menu item must be vegan.
    VeganOnlyHours {
        hours: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vegan_items: Option<Vec<String>>,
    },

    MaxMenuItems {
        #[serde(alias = "value")]
        limit: usize,
    },

    MinMenuItems {
        #[serde(alias = "value")]
        limit: usize,
    },

    MustIncludeItem { item: String },
}

impl Rule {
    /// Every `type` tag the rule engine understands.
    pub const KINDS: [&'static str; 7] = [
        "required_location_hours",
        "max_price",
        "forbidden_item_hours",
        "vegan_only_hours",
        "max_menu_items",
        "min_menu_items",
        "must_include_item",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Rule::RequiredLocationHours { .. } => "required_location_hours",
            Rule::MaxPrice { .. } => "max_price",
            Rule::ForbiddenItemHours { .. } => "forbidden_item_hours",
            Rule::VeganOnlyHours { .. } => "vegan_only_hours",
            Rule::MaxMenuItems { .. } => "max_menu_items",
            Rule::MinMenuItems { .. } => "min_menu_items",
            Rule::MustIncludeItem { .. } => "must_include_item",
        }
    }

    /// Hours named by the rule.
    pub fn hours(&self) -> &[String] {
        match self {
            Rule::RequiredLocationHours { hours, .. }
            | Rule::ForbiddenItemHours { hours, .. }
            | Rule::VeganOnlyHours { hours, .. } => hours,
            _ => &[],
        }
    }

    /// Catalogue item named by the rule, if any.
    pub fn item(&self) -> Option<&str> {
        match self {
            Rule::MaxPrice { item, .. } => item.as_deref(),
            Rule::ForbiddenItemHours { item, .. } | Rule::MustIncludeItem { item } => Some(item),
            _ => None,
        }
    }

    /// Location named by the rule, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Rule::RequiredLocationHours { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// One entry of a case's `constraints` list.
///
/// Unknown `type` tags are kept as [`Constraint::Unrecognized`] so they can be
/// reported as configuration errors instead of failing the whole case. A known
/// tag with malformed parameters is a deserialization error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Constraint {
    Rule(Rule),
    Unrecognized {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::custom("constraint missing string field `type`"))?
            .to_string();

        if !Rule::KINDS.contains(&kind.as_str()) {
            return Ok(Constraint::Unrecognized { kind });
        }

        Rule::deserialize(value)
            .map(Constraint::Rule)
            .map_err(|e| D::Error::custom(format!("invalid {kind} constraint: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_known_rule() {
        let c: Constraint =
            serde_json::from_value(json!({"type": "must_include_item", "item": "Wrap"})).unwrap();
        assert_eq!(
            c,
            Constraint::Rule(Rule::MustIncludeItem {
                item: "Wrap".to_string()
            })
        );
    }

    #[test]
    fn test_value_alias_for_limit() {
        let c: Constraint =
            serde_json::from_value(json!({"type": "max_menu_items", "value": 3})).unwrap();
        assert_eq!(c, Constraint::Rule(Rule::MaxMenuItems { limit: 3 }));

        let c: Constraint =
            serde_json::from_value(json!({"type": "max_price", "value": 12.5})).unwrap();
        assert_eq!(
            c,
            Constraint::Rule(Rule::MaxPrice {
                item: None,
                limit: 12.5
            })
        );
    }

    #[test]
    fn test_unknown_kind_is_unrecognized() {
        let c: Constraint =
            serde_json::from_value(json!({"type": "no_rain_hours", "hours": ["09"]})).unwrap();
        assert_eq!(
            c,
            Constraint::Unrecognized {
                kind: "no_rain_hours".to_string()
            }
        );
    }

    #[test]
    fn test_known_kind_with_bad_params_fails() {
        let err = serde_json::from_value::<Constraint>(json!({"type": "must_include_item"}))
            .unwrap_err();
        assert!(err.to_string().contains("must_include_item"));
    }

    #[test]
    fn test_missing_type_fails() {
        assert!(serde_json::from_value::<Constraint>(json!({"item": "Wrap"})).is_err());
    }

    #[test]
    fn test_kinds_match_variants() {
        let rules = [
            Rule::RequiredLocationHours {
                location: "Stand".into(),
                hours: vec![],
                min_hours: None,
            },
            Rule::MaxPrice {
                item: None,
                limit: 1.0,
            },
            Rule::ForbiddenItemHours {
                item: "Wrap".into(),
                hours: vec![],
            },
            Rule::VeganOnlyHours {
                hours: vec![],
                vegan_items: None,
            },
            Rule::MaxMenuItems { limit: 1 },
            Rule::MinMenuItems { limit: 1 },
            Rule::MustIncludeItem {
                item: "Wrap".into(),
            },
        ];
        for (rule, kind) in rules.iter().zip(Rule::KINDS) {
            assert_eq!(rule.kind(), kind);
        }
    }
}
