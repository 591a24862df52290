use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price_in_cents: i64,
    pub in_stock: bool,
    pub series: String,
}

/// Replacement values for an update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub price_in_cents: Option<i64>,
    pub in_stock: Option<bool>,
    pub series: Option<String>,
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} - {} [Series: {}]",
            self.id,
            self.name,
            format_price(self.price_in_cents),
            self.series
        )
    }
}

pub fn format_price(price: i64) -> String {
    let sign = if price < 0 { "-" } else { "" };
    let cents = price.unsigned_abs();
    let numeral = cents / 100;
    let decimal = cents % 100;

    format!("{}${}.{}", sign, numeral, format_args!("{:02}", decimal))
}

impl Item {
    pub fn new(id: i64, name: &str, price_in_cents: i64, in_stock: bool, series: &str) -> Self {
        Item {
            id,
            name: name.to_string(),
            price_in_cents,
            in_stock,
            series: series.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        self.to_string()
    }

    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name.filter(|name| !name.trim().is_empty()) {
            self.name = name;
        }
        if let Some(price) = patch.price_in_cents {
            self.price_in_cents = price;
        }
        if let Some(in_stock) = patch.in_stock {
            self.in_stock = in_stock;
        }
        if let Some(series) = patch.series.filter(|series| !series.trim().is_empty()) {
            self.series = series;
        }
    }
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price_in_cents.is_none()
            && self.in_stock.is_none()
            && self.series.is_none()
    }
}
