//! Display formatting for prices and cart snapshots.
//!
//! Formatting works on a rounded copy; the amounts stored in the cart and
//! used for totals are never touched.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{iso, Formatter, Money as CurrencyAmount, Params, Position};
use serde::Serialize;
use uuid::Uuid;

use crate::config::DEFAULT_CURRENCY_SUFFIX;
use crate::domain::{Cart, CartError, LineItem, Money, ProductId};

// Enough thousands groups for any `Decimal` integer part.
const GROUPS: usize = 10;

/// Locale-style number formatting with a fixed currency suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceFormatter {
    pub group_separator: char,
    pub decimal_separator: char,
    pub max_fraction_digits: u32,
    pub suffix: String,
}

/// Vietnamese grouping (`20.000`) with the `VNĐ` suffix.
impl Default for PriceFormatter {
    fn default() -> Self {
        Self {
            group_separator: '.',
            decimal_separator: ',',
            max_fraction_digits: 3,
            suffix: DEFAULT_CURRENCY_SUFFIX.to_string(),
        }
    }
}

impl PriceFormatter {
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Rounds half away from zero to at most `max_fraction_digits`, drops
    /// trailing zeros, then groups through `rusty_money`.
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount
            .round_dp_with_strategy(self.max_fraction_digits, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let params = Params {
            digit_separator: self.group_separator,
            exponent_separator: self.decimal_separator,
            separator_pattern: &[3; GROUPS],
            positions: &[Position::Amount],
            rounding: None,
            ..Params::default()
        };
        let magnitude = Formatter::money(&CurrencyAmount::from_decimal(rounded.abs(), iso::VND), params);

        let mut out = String::with_capacity(magnitude.len() + self.suffix.len() + 2);
        if rounded < Decimal::ZERO {
            out.push('-');
        }
        out.push_str(&magnitude);
        if !self.suffix.is_empty() {
            out.push(' ');
            out.push_str(&self.suffix);
        }
        out
    }

    pub fn format_money(&self, money: Money) -> String { self.format(money.amount()) }
}

/// Formats with the default (Vietnamese) formatter.
pub fn format_price(money: Money) -> String { PriceFormatter::default().format_money(money) }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: Money,
    pub price_display: String,
    pub line_total: Money,
    pub line_total_display: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub cart_id: Uuid,
    pub items: Vec<LineItemView>,
    pub item_count: usize,
    pub unit_count: u64,
    pub total: Money,
    pub total_display: String,
}

impl LineItemView {
    pub fn from_item(item: &LineItem, formatter: &PriceFormatter) -> Result<Self, CartError> {
        let line_total = item.line_total()?;
        Ok(Self {
            product_id: item.product.id.clone(),
            name: item.product.name.clone(),
            image_url: item.product.image_or_placeholder().to_string(),
            quantity: item.quantity.value(),
            price: item.price(),
            price_display: formatter.format_money(item.price()),
            line_total,
            line_total_display: formatter.format_money(line_total),
        })
    }
}

impl CartView {
    pub fn from_cart(cart: &Cart, formatter: &PriceFormatter) -> Result<Self, CartError> {
        let items = cart.items().iter()
            .map(|item| LineItemView::from_item(item, formatter))
            .collect::<Result<Vec<_>, _>>()?;
        let total = cart.total()?;
        Ok(Self {
            cart_id: cart.id(),
            items,
            item_count: cart.item_count(),
            unit_count: cart.unit_count(),
            total,
            total_display: formatter.format_money(total),
        })
    }
}
