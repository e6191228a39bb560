use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::models::{Case, Constraint, Prediction, Rule};
use crate::scoring::constants::CONSTRAINT_WEIGHT;

/// Pass/fail tally of a case's business rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub passed: usize,
    pub total: usize,
    pub failures: Vec<String>,
    /// Constraint records excluded from the tally.
    pub config_errors: Vec<String>,
}

impl RuleOutcome {
    /// Constraint component: full marks when there is nothing to violate.
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            CONSTRAINT_WEIGHT
        } else {
            CONSTRAINT_WEIGHT * self.passed as f64 / self.total as f64
        }
    }
}

/// The parts of a plan the rules look at.
struct PlanView<'a> {
    menu: BTreeSet<&'a str>,
    hour_map: BTreeMap<&'a str, &'a str>,
}

impl PlanView<'_> {
    fn serves_any(&self, hours: &[String]) -> bool {
        hours.iter().any(|h| self.hour_map.contains_key(h.as_str()))
    }
}

/// Evaluate every rule of the case independently against a feasible plan.
pub fn evaluate(case: &Case, prediction: &Prediction) -> RuleOutcome {
    let view = PlanView {
        menu: prediction.selected_items(),
        hour_map: prediction.hour_map(),
    };
    let mut outcome = RuleOutcome::default();

    for constraint in &case.constraints {
        match constraint {
            Constraint::Unrecognized { kind } => {
                warn!(case = %case.id, kind = %kind, "skipping unrecognized constraint");
                outcome
                    .config_errors
                    .push(format!("unrecognized constraint type '{kind}'"));
            }
            Constraint::Rule(rule) => {
                outcome.total += 1;
                match rule_failure(case, &view, rule) {
                    None => outcome.passed += 1,
                    Some(reason) => outcome.failures.push(reason),
                }
            }
        }
    }

    outcome
}

/// Why `rule` fails for the plan, or `None` when it passes.
fn rule_failure(case: &Case, view: &PlanView<'_>, rule: &Rule) -> Option<String> {
    let kind = rule.kind();
    match rule {
        Rule::RequiredLocationHours {
            location,
            hours,
            min_hours,
        } => {
            let elsewhere: Vec<&str> = hours
                .iter()
                .map(String::as_str)
                .filter(|h| view.hour_map.get(h) != Some(&location.as_str()))
                .collect();
            if !elsewhere.is_empty() {
                return Some(format!(
                    "{kind}: {location} not served at {}",
                    elsewhere.join(", ")
                ));
            }
            let served = view
                .hour_map
                .values()
                .filter(|loc| **loc == location.as_str())
                .count();
            match min_hours {
                Some(min) if served < *min => Some(format!(
                    "{kind}: {location} served {served} of required {min} hours"
                )),
                _ => None,
            }
        }

        Rule::MaxPrice { item, limit } => {
            let checked: Vec<&str> = match item {
                Some(item) => view
                    .menu
                    .iter()
                    .copied()
                    .filter(|m| *m == item.as_str())
                    .collect(),
                None => view.menu.iter().copied().collect(),
            };
            checked.into_iter().find_map(|name| {
                let price = case.menu_items.get(name)?.price;
                (price > *limit).then(|| format!("{kind}: {name} priced {price} over {limit}"))
            })
        }

        Rule::ForbiddenItemHours { item, hours } => (view.menu.contains(item.as_str())
            && view.serves_any(hours))
        .then(|| format!("{kind}: {item} offered during {}", hours.join(", "))),

        Rule::VeganOnlyHours { hours, vegan_items } => {
            if !view.serves_any(hours) {
                return None;
            }
            view.menu.iter().find_map(|name| {
                let vegan = match vegan_items {
                    Some(list) => Some(list.iter().any(|v| v == name)),
                    None => case.menu_items.get(*name).and_then(|m| m.is_vegan()),
                };
                match vegan {
                    Some(true) => None,
                    Some(false) => Some(format!("{kind}: {name} is not vegan")),
                    None => Some(format!("{kind}: no vegan information for {name}")),
                }
            })
        }

        Rule::MaxMenuItems { limit } => (view.menu.len() > *limit).then(|| {
            format!("{kind}: {} items over limit {limit}", view.menu.len())
        }),

        Rule::MinMenuItems { limit } => (view.menu.len() < *limit).then(|| {
            format!("{kind}: {} items under minimum {limit}", view.menu.len())
        }),

        Rule::MustIncludeItem { item } => (!view.menu.contains(item.as_str()))
            .then(|| format!("{kind}: {item} not on menu")),
    }
}
