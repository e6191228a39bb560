use std::fmt;

use strsim::jaro_winkler;
use tracing::trace;

use crate::models::{Case, Prediction};
use crate::scoring::constants::{LIMIT_TOLERANCE, SUGGESTION_THRESHOLD};

/// A hard-constraint failure that zeroes the plan's score.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    UnknownIngredient {
        name: String,
        suggestion: Option<String>,
    },
    UnknownMenuItem {
        name: String,
        suggestion: Option<String>,
    },
    UnknownLocation {
        name: String,
        suggestion: Option<String>,
    },
    UnknownHour {
        hour: String,
    },
    InvalidQuantity {
        ingredient: String,
        quantity: f64,
    },
    EmptyRouteBlock {
        location: String,
    },
    BudgetExceeded {
        spend: f64,
        budget: f64,
    },
    CapacityExceeded {
        storage: f64,
        capacity: f64,
    },
    HourCoverage {
        missing: Vec<String>,
        conflicting: Vec<String>,
    },
    EmptyMenu,
    MalformedPrediction(String),
    MissingPrediction,
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default()
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownIngredient { name, suggestion } => {
                write!(f, "unknown ingredient '{name}'{}", did_you_mean(suggestion))
            }
            Violation::UnknownMenuItem { name, suggestion } => {
                write!(f, "unknown menu item '{name}'{}", did_you_mean(suggestion))
            }
            Violation::UnknownLocation { name, suggestion } => {
                write!(f, "unknown location '{name}'{}", did_you_mean(suggestion))
            }
            Violation::UnknownHour { hour } => write!(f, "unknown hour '{hour}'"),
            Violation::InvalidQuantity {
                ingredient,
                quantity,
            } => write!(f, "invalid purchase quantity for '{ingredient}': {quantity}"),
            Violation::EmptyRouteBlock { location } => {
                write!(f, "route block for '{location}' has no hours")
            }
            Violation::BudgetExceeded { spend, budget } => {
                write!(f, "budget exceeded (spend {spend:.2} > budget {budget:.2})")
            }
            Violation::CapacityExceeded { storage, capacity } => write!(
                f,
                "capacity exceeded (storage {storage:.2} > capacity {capacity:.2})"
            ),
            Violation::HourCoverage {
                missing,
                conflicting,
            } => {
                write!(f, "incomplete or conflicting hour coverage")?;
                let mut details = Vec::new();
                if !missing.is_empty() {
                    details.push(format!("missing: {}", missing.join(", ")));
                }
                if !conflicting.is_empty() {
                    details.push(format!("conflicting: {}", conflicting.join(", ")));
                }
                if !details.is_empty() {
                    write!(f, " ({})", details.join("; "))?;
                }
                Ok(())
            }
            Violation::EmptyMenu => write!(f, "no menu items selected"),
            Violation::MalformedPrediction(reason) => write!(f, "malformed prediction: {reason}"),
            Violation::MissingPrediction => write!(f, "missing prediction"),
        }
    }
}

/// Outcome of the feasibility gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Feasibility {
    pub feasible: bool,
    pub violations: Vec<Violation>,
}

impl Feasibility {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            feasible: violations.is_empty(),
            violations,
        }
    }

    /// Human-readable reasons, in detection order.
    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Closest catalogue name to `name`, if any is similar enough.
pub fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a String>) -> Option<String> {
    let needle = name.to_lowercase();
    candidates
        .into_iter()
        .map(|c| (c, jaro_winkler(&c.to_lowercase(), &needle)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .fold(None, |best: Option<(&String, f64)>, (c, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((c, score)),
        })
        .map(|(c, _)| c.clone())
}

/// Run every hard check against a plan, collecting all violations.
///
/// Assumes `case` already passed [`Case::check`].
pub fn check_plan(case: &Case, prediction: &Prediction) -> Feasibility {
    let mut violations = Vec::new();

    check_references(case, prediction, &mut violations);

    let spend = case.stock_value(&prediction.purchases);
    if spend > case.budget + LIMIT_TOLERANCE {
        violations.push(Violation::BudgetExceeded {
            spend,
            budget: case.budget,
        });
    }

    let storage = case.stock_storage(&prediction.purchases);
    if storage > case.capacity_units + LIMIT_TOLERANCE {
        violations.push(Violation::CapacityExceeded {
            storage,
            capacity: case.capacity_units,
        });
    }

    if let Some(violation) = check_coverage(case, prediction) {
        violations.push(violation);
    }

    if prediction.menu.is_empty() {
        violations.push(Violation::EmptyMenu);
    }

    trace!(
        case = %case.id,
        spend,
        storage,
        violations = violations.len(),
        "feasibility checked"
    );

    Feasibility::from_violations(violations)
}

fn check_references(case: &Case, prediction: &Prediction, violations: &mut Vec<Violation>) {
    for (name, qty) in &prediction.purchases {
        if !case.ingredients.contains_key(name) {
            violations.push(Violation::UnknownIngredient {
                name: name.clone(),
                suggestion: suggest(name, case.ingredients.keys()),
            });
        } else if !(qty.is_finite() && *qty >= 0.0) {
            violations.push(Violation::InvalidQuantity {
                ingredient: name.clone(),
                quantity: *qty,
            });
        }
    }

    for item in prediction.selected_items() {
        if !case.menu_items.contains_key(item) {
            violations.push(Violation::UnknownMenuItem {
                name: item.to_string(),
                suggestion: suggest(item, case.menu_items.keys()),
            });
        }
    }

    for block in &prediction.route {
        if !case.locations.contains_key(&block.location) {
            violations.push(Violation::UnknownLocation {
                name: block.location.clone(),
                suggestion: suggest(&block.location, case.locations.keys()),
            });
        }
        if block.hours.is_empty() {
            violations.push(Violation::EmptyRouteBlock {
                location: block.location.clone(),
            });
        }
        for hour in &block.hours {
            if !case.has_hour(hour) {
                violations.push(Violation::UnknownHour { hour: hour.clone() });
            }
        }
    }
}

/// Every hour must be served by exactly one location.
fn check_coverage(case: &Case, prediction: &Prediction) -> Option<Violation> {
    let assignments = prediction.hour_assignments();
    let mut missing = Vec::new();
    let mut conflicting = Vec::new();

    for hour in &case.hours {
        match assignments.get(hour.as_str()) {
            None => missing.push(hour.clone()),
            Some(locations) if locations.len() > 1 => conflicting.push(hour.clone()),
            Some(_) => {}
        }
    }

    if missing.is_empty() && conflicting.is_empty() {
        None
    } else {
        Some(Violation::HourCoverage {
            missing,
            conflicting,
        })
    }
}
