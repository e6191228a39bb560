use std::collections::BTreeMap;

use tracing::trace;

use crate::models::{Case, MenuItem, Prediction};
use crate::scoring::constants::UNIT_TOLERANCE;

/// Money flows of a simulated service day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sales {
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    /// Cost of purchased stock never consumed by a sale.
    pub leftover_cost: f64,
    pub units_sold: BTreeMap<String, u64>,
}

/// Inventory and takings threaded through the hourly fold.
#[derive(Debug, Clone)]
struct ServiceState {
    inventory: BTreeMap<String, f64>,
    revenue: f64,
    units_sold: BTreeMap<String, u64>,
}

impl ServiceState {
    /// Units of `item` the current inventory can still make.
    fn supportable_units(&self, item: &MenuItem) -> u64 {
        item.ingredients
            .iter()
            .filter(|(_, per_unit)| **per_unit > 0.0)
            .map(|(ingredient, per_unit)| {
                let stock = self.inventory.get(ingredient).copied().unwrap_or(0.0);
                whole_units(stock / per_unit)
            })
            .min()
            .unwrap_or(u64::MAX)
    }

    /// Serve one hour of demand, items in ascending name order.
    fn serve_hour(mut self, menu: &[(&str, &MenuItem)], demand: f64) -> Self {
        let mut remaining = whole_units(demand);

        for (name, item) in menu {
            if remaining == 0 {
                break;
            }

            let sold = remaining.min(self.supportable_units(item));
            if sold == 0 {
                continue;
            }

            for (ingredient, per_unit) in &item.ingredients {
                if let Some(stock) = self.inventory.get_mut(ingredient) {
                    *stock = (*stock - per_unit * sold as f64).max(0.0);
                }
            }

            remaining -= sold;
            self.revenue += item.price * sold as f64;
            let tally = self.units_sold.entry(name.to_string()).or_insert(0);
            *tally = tally.saturating_add(sold);
        }

        self
    }
}

/// Floor a non-negative quantity to whole units, saturating at `u64::MAX`.
fn whole_units(quantity: f64) -> u64 {
    if quantity.is_finite() && quantity > 0.0 {
        (quantity + UNIT_TOLERANCE).floor() as u64
    } else {
        0
    }
}

/// Simulate hour-by-hour sales of a feasible plan.
///
/// Inventory starts at the purchased quantities and is shared across the
/// whole horizon, so earlier hours have first claim on stock. Unsold demand
/// is lost.
pub fn simulate(case: &Case, prediction: &Prediction) -> Sales {
    let menu: Vec<(&str, &MenuItem)> = prediction
        .selected_items()
        .into_iter()
        .filter_map(|name| {
            case.menu_items
                .get_key_value(name)
                .map(|(name, item)| (name.as_str(), item))
        })
        .collect();
    let hour_map = prediction.hour_map();

    let initial = ServiceState {
        inventory: prediction.purchases.clone(),
        revenue: 0.0,
        units_sold: menu.iter().map(|(name, _)| (name.to_string(), 0)).collect(),
    };

    let state = case.hours.iter().fold(initial, |state, hour| {
        let demand = hour_map
            .get(hour.as_str())
            .map(|location| case.demand(location, hour))
            .unwrap_or(0.0);
        state.serve_hour(&menu, demand)
    });

    let cost = case.stock_value(&prediction.purchases);
    let leftover_cost = case.stock_value(&state.inventory);
    let profit = state.revenue - cost;

    trace!(
        case = %case.id,
        revenue = state.revenue,
        cost,
        leftover_cost,
        "sales simulated"
    );

    Sales {
        revenue: state.revenue,
        cost,
        profit,
        leftover_cost,
        units_sold: state.units_sold,
    }
}
