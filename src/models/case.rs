use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OpsError, Result};
use crate::models::constraint::{Constraint, Rule};
use crate::models::id;

/// A purchasable ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Price paid per unit purchased.
    #[serde(alias = "cost")]
    pub unit_cost: f64,

    /// Storage units occupied per unit purchased.
    #[serde(alias = "storage")]
    pub storage_units: f64,
}

/// A sellable menu item with a fixed price and recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub price: f64,

    /// Ingredient quantity consumed per unit sold.
    #[serde(default)]
    pub ingredients: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegan: Option<bool>,
}

impl MenuItem {
    /// Vegan flag from the catalogue, `None` when the item carries no diet data.
    ///
    /// An explicit `vegan` flag takes precedence over the `diet` label.
    pub fn is_vegan(&self) -> Option<bool> {
        self.vegan.or_else(|| {
            self.diet
                .as_deref()
                .map(|diet| diet.eq_ignore_ascii_case("vegan"))
        })
    }
}

/// Normalizer mapping raw profit onto the profit score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfitScale {
    /// Profit equal to the scale earns full marks.
    Flat(f64),

    /// Profit at `floor` earns nothing, profit at `target` earns full marks.
    Range { floor: f64, target: f64 },
}

impl ProfitScale {
    /// Fraction of full profit marks reached, unclamped.
    pub fn ratio(&self, profit: f64) -> f64 {
        match *self {
            ProfitScale::Flat(scale) => profit / scale,
            ProfitScale::Range { floor, target } => (profit - floor) / (target - floor).max(1.0),
        }
    }
}

fn unknown_id() -> String {
    "unknown".to_string()
}

/// A single grading task: horizon, resources, catalogue, and rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default = "unknown_id", deserialize_with = "id::deserialize")]
    pub id: String,

    /// Planning horizon in service order.
    pub hours: Vec<String>,

    pub budget: f64,

    pub capacity_units: f64,

    /// Location name -> hour -> units demanded.
    pub locations: BTreeMap<String, BTreeMap<String, f64>>,

    pub menu_items: BTreeMap<String, MenuItem>,

    pub ingredients: BTreeMap<String, Ingredient>,

    pub constraints: Vec<Constraint>,

    pub profit_scale: ProfitScale,
}

impl Case {
    /// Parse a case from a JSON value, attributing failures to the case id.
    pub fn from_value(value: Value) -> Result<Self> {
        let id = id::of(&value).unwrap_or_else(unknown_id);
        serde_json::from_value(value).map_err(|e| OpsError::invalid_case(&id, e.to_string()))
    }

    /// Units demanded at `location` during `hour` (0 when undeclared).
    pub fn demand(&self, location: &str, hour: &str) -> f64 {
        self.locations
            .get(location)
            .and_then(|hours| hours.get(hour))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn has_hour(&self, hour: &str) -> bool {
        self.hours.iter().any(|h| h == hour)
    }

    /// Monetary value of a stock of ingredients at unit cost.
    ///
    /// Unknown ingredients contribute nothing.
    pub fn stock_value(&self, stock: &BTreeMap<String, f64>) -> f64 {
        stock
            .iter()
            .filter_map(|(name, qty)| self.ingredients.get(name).map(|i| i.unit_cost * qty))
            .sum()
    }

    /// Storage units occupied by a stock of ingredients.
    pub fn stock_storage(&self, stock: &BTreeMap<String, f64>) -> f64 {
        stock
            .iter()
            .filter_map(|(name, qty)| self.ingredients.get(name).map(|i| i.storage_units * qty))
            .sum()
    }

    /// Rules that the engine can evaluate, in declared order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::Rule(rule) => Some(rule),
            Constraint::Unrecognized { .. } => None,
        })
    }

    /// Check the case invariants the scorer relies on.
    ///
    /// A case that fails here is a configuration error; scoring it would
    /// silently miscompute.
    pub fn check(&self) -> Result<()> {
        if self.hours.is_empty() {
            return Err(self.invalid("hours empty"));
        }

        let mut seen = BTreeSet::new();
        for hour in &self.hours {
            if !seen.insert(hour.as_str()) {
                return Err(self.invalid(format!("duplicate hour: {hour}")));
            }
        }

        self.check_amount("budget", self.budget)?;
        self.check_amount("capacity_units", self.capacity_units)?;
        self.check_profit_scale()?;

        for (location, demand) in &self.locations {
            for (hour, units) in demand {
                if !seen.contains(hour.as_str()) {
                    return Err(self.invalid(format!(
                        "location {location} declares demand for unknown hour {hour}"
                    )));
                }
                self.check_amount(&format!("demand {location}@{hour}"), *units)?;
            }
        }

        for (name, ingredient) in &self.ingredients {
            self.check_amount(&format!("unit_cost of {name}"), ingredient.unit_cost)?;
            self.check_amount(&format!("storage_units of {name}"), ingredient.storage_units)?;
        }

        for (name, item) in &self.menu_items {
            self.check_amount(&format!("price of {name}"), item.price)?;
            for (ingredient, qty) in &item.ingredients {
                if !self.ingredients.contains_key(ingredient) {
                    return Err(self.invalid(format!(
                        "menu item {name} uses unknown ingredient {ingredient}"
                    )));
                }
                self.check_amount(&format!("{ingredient} per {name}"), *qty)?;
            }
        }

        for rule in self.rules() {
            self.check_rule(rule, &seen)?;
        }

        Ok(())
    }

    fn check_rule(&self, rule: &Rule, hours: &BTreeSet<&str>) -> Result<()> {
        let kind = rule.kind();
        if let Some(hour) = rule.hours().iter().find(|h| !hours.contains(h.as_str())) {
            return Err(self.invalid(format!("{kind} constraint names unknown hour {hour}")));
        }
        if let Some(item) = rule.item() {
            if !self.menu_items.contains_key(item) {
                return Err(self.invalid(format!("{kind} constraint names unknown item {item}")));
            }
        }
        if let Some(location) = rule.location() {
            if !self.locations.contains_key(location) {
                return Err(self.invalid(format!(
                    "{kind} constraint names unknown location {location}"
                )));
            }
        }
        match rule {
            Rule::RequiredLocationHours {
                hours, min_hours, ..
            } if hours.is_empty() && min_hours.is_none() => {
                Err(self.invalid("required_location_hours needs hours or min_hours"))
            }
            Rule::MaxPrice { limit, .. } => self.check_amount("max_price limit", *limit),
            _ => Ok(()),
        }
    }

    fn check_profit_scale(&self) -> Result<()> {
        match self.profit_scale {
            ProfitScale::Flat(scale) if !(scale.is_finite() && scale > 0.0) => Err(
                self.invalid(format!("profit_scale must be positive, got {scale}")),
            ),
            ProfitScale::Range { floor, target } if !(floor.is_finite() && target.is_finite()) => {
                Err(self.invalid("profit_scale floor and target must be finite"))
            }
            _ => Ok(()),
        }
    }

    fn check_amount(&self, field: &str, value: f64) -> Result<()> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(self.invalid(format!(
                "{field} must be finite and non-negative, got {value}"
            )))
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> OpsError {
        OpsError::invalid_case(&self.id, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_case() -> Value {
        json!({
            "id": "c1",
            "hours": ["09", "10"],
            "budget": 100,
            "capacity_units": 50,
            "locations": {"Stand": {"09": 4, "10": 6}},
            "menu_items": {
                "Wrap": {"price": 10, "ingredients": {"wrap": 1}},
                "Salad": {"price": 8, "ingredients": {"greens": 2}, "diet": "vegan"}
            },
            "ingredients": {
                "wrap": {"unit_cost": 2, "storage_units": 1},
                "greens": {"cost": 1, "storage": 0.5}
            },
            "constraints": [],
            "profit_scale": 150
        })
    }

    #[test]
    fn test_parse_and_check() {
        let case = Case::from_value(sample_case()).unwrap();
        assert!(case.check().is_ok());
        assert_eq!(case.ingredients["greens"].storage_units, 0.5);
        assert_eq!(case.demand("Stand", "10"), 6.0);
        assert_eq!(case.demand("Stand", "11"), 0.0);
        assert_eq!(case.demand("Park", "09"), 0.0);
    }

    #[test]
    fn test_profit_scale_forms() {
        assert_eq!(ProfitScale::Flat(150.0).ratio(75.0), 0.5);
        let range = ProfitScale::Range {
            floor: 50.0,
            target: 150.0,
        };
        assert_eq!(range.ratio(100.0), 0.5);

        let mut value = sample_case();
        value["profit_scale"] = json!({"floor": 0, "target": 200});
        let case = Case::from_value(value).unwrap();
        assert_eq!(
            case.profit_scale,
            ProfitScale::Range {
                floor: 0.0,
                target: 200.0
            }
        );
    }

    #[test]
    fn test_vegan_flag() {
        let case = Case::from_value(sample_case()).unwrap();
        assert_eq!(case.menu_items["Salad"].is_vegan(), Some(true));
        assert_eq!(case.menu_items["Wrap"].is_vegan(), None);
    }

    #[test]
    fn test_stock_value_ignores_unknown() {
        let case = Case::from_value(sample_case()).unwrap();
        let stock = BTreeMap::from([("wrap".to_string(), 3.0), ("tofu".to_string(), 9.0)]);
        assert_eq!(case.stock_value(&stock), 6.0);
        assert_eq!(case.stock_storage(&stock), 3.0);
    }

    #[test]
    fn test_numeric_id_becomes_text() {
        let mut value = sample_case();
        value["id"] = json!(42);
        let case = Case::from_value(value.clone()).unwrap();
        assert_eq!(case.id, "42");

        value.as_object_mut().unwrap().remove("budget");
        let err = Case::from_value(value).unwrap_err();
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_missing_field_names_case() {
        let mut value = sample_case();
        value.as_object_mut().unwrap().remove("budget");
        let err = Case::from_value(value).unwrap_err();
        assert!(err.to_string().contains("c1"));
        assert!(err.to_string().contains("budget"));
    }

    #[test]
    fn test_check_rejects_bad_cases() {
        let cases = [
            ("hours", json!([])),
            ("hours", json!(["09", "09"])),
            ("budget", json!(-1)),
            ("profit_scale", json!(0)),
            ("locations", json!({"Stand": {"12": 4}})),
            (
                "menu_items",
                json!({"Wrap": {"price": 10, "ingredients": {"tortilla": 1}}}),
            ),
            (
                "constraints",
                json!([{"type": "must_include_item", "item": "Taco"}]),
            ),
            (
                "constraints",
                json!([{"type": "forbidden_item_hours", "item": "Wrap", "hours": ["23"]}]),
            ),
            (
                "constraints",
                json!([{"type": "required_location_hours", "location": "Stand"}]),
            ),
        ];

        for (field, bad) in cases {
            let mut value = sample_case();
            value[field] = bad.clone();
            let case = Case::from_value(value).unwrap();
            assert!(case.check().is_err(), "{field} = {bad} should be rejected");
        }
    }

    #[test]
    fn test_unrecognized_constraint_is_not_a_case_error() {
        let mut value = sample_case();
        value["constraints"] = json!([{"type": "weather_hours", "hours": ["09"]}]);
        let case = Case::from_value(value).unwrap();
        assert!(case.check().is_ok());
        assert_eq!(case.rules().count(), 0);
    }
}
