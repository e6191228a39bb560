use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::id;

/// One menu selection, either `{"item": "Wrap"}` or a bare `"Wrap"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuChoice {
    Entry { item: String },
    Name(String),
}

impl MenuChoice {
    pub fn item(&self) -> &str {
        match self {
            MenuChoice::Entry { item } | MenuChoice::Name(item) => item,
        }
    }
}

/// A block of hours served at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteBlock {
    pub location: String,
    pub hours: Vec<String>,
}

/// A candidate plan. Validated by the scorer, never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(
        default,
        deserialize_with = "id::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    pub menu: Vec<MenuChoice>,

    /// Ingredient name -> quantity purchased.
    pub purchases: BTreeMap<String, f64>,

    pub route: Vec<RouteBlock>,
}

impl Prediction {
    /// Selected item names, duplicates collapsed, in ascending order.
    pub fn selected_items(&self) -> BTreeSet<&str> {
        self.menu.iter().map(MenuChoice::item).collect()
    }

    /// Every location each hour is routed to.
    pub fn hour_assignments(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut assignments: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for block in &self.route {
            for hour in &block.hours {
                assignments
                    .entry(hour.as_str())
                    .or_default()
                    .insert(block.location.as_str());
            }
        }
        assignments
    }

    /// Hour -> serving location, taking the first block that covers the hour.
    ///
    /// Unique for any plan that passed feasibility.
    pub fn hour_map(&self) -> BTreeMap<&str, &str> {
        let mut map = BTreeMap::new();
        for block in &self.route {
            for hour in &block.hours {
                map.entry(hour.as_str()).or_insert(block.location.as_str());
            }
        }
        map
    }
}

/// A prediction line as loaded from storage.
///
/// A record that does not parse keeps its parse error so that the case it
/// answers can be graded as infeasible rather than aborting the run.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub id: Option<String>,
    pub plan: std::result::Result<Prediction, String>,
}

impl PredictionRecord {
    pub fn from_value(value: Value) -> Self {
        let id = id::of(&value);
        let plan = serde_json::from_value::<Prediction>(value).map_err(|e| e.to_string());
        Self { id, plan }
    }
}

impl From<Prediction> for PredictionRecord {
    fn from(plan: Prediction) -> Self {
        Self {
            id: plan.id.clone(),
            plan: Ok(plan),
        }
    }
}
