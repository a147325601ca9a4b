use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single line in a basket.
///
/// `amount` is the unit amount in minor currency units and may be negative
/// for discounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketItem {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub count: u32,
    pub amount: i64,
}

impl BasketItem {
    pub fn new(label: &str, count: u32, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.to_string(),
            category: None,
            count,
            amount,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Count multiplied by the unit amount, saturating at the `i64` bounds.
    pub fn total_amount(&self) -> i64 {
        i64::from(self.count).saturating_mul(self.amount)
    }

    pub fn add_one(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn remove_one(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

/// An ordered collection of basket items, most recently added first.
///
/// The label is the only identity used when merging or removing: two items
/// sharing a label are treated as the same line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    display_items: Vec<BasketItem>,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_items(&self) -> &[BasketItem] {
        &self.display_items
    }

    /// Inserts the item at the front without merging.
    pub fn add_item(&mut self, item: BasketItem) {
        self.display_items.insert(0, item);
    }

    /// Inserts the items at the front, keeping their relative order. No merging.
    pub fn add_items_front(&mut self, items: impl IntoIterator<Item = BasketItem>) {
        let existing = std::mem::take(&mut self.display_items);
        self.display_items = items.into_iter().collect();
        self.display_items.extend(existing);
    }

    /// Increases the count of an existing line with the same label, or inserts
    /// the item at the front.
    pub fn add_item_merge(&mut self, item: BasketItem) {
        match self.get_item_mut(&item.label) {
            Some(line) => line.count = line.count.saturating_add(item.count),
            None => self.add_item(item),
        }
    }

    /// Merges every line of `other` into this basket.
    pub fn add_items(&mut self, other: &Basket) {
        for item in &other.display_items {
            self.add_item_merge(item.clone());
        }
    }

    pub fn has_item(&self, label: &str) -> bool {
        self.display_items.iter().any(|item| item.label == label)
    }

    pub fn get_item(&self, label: &str) -> Option<&BasketItem> {
        self.display_items.iter().find(|item| item.label == label)
    }

    fn get_item_mut(&mut self, label: &str) -> Option<&mut BasketItem> {
        self.display_items.iter_mut().find(|item| item.label == label)
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.display_items.iter().position(|item| item.label == label)
    }

    /// Adds a single unit to the matching line, or inserts the item as given.
    pub fn add_one_of(&mut self, item: BasketItem) {
        match self.get_item_mut(&item.label) {
            Some(line) => line.add_one(),
            None => self.add_item(item),
        }
    }

    /// Removes a single unit from the matching line.
    ///
    /// When the last unit goes, the line is removed unless `retain` is set, in
    /// which case it stays with a count of zero.
    pub fn remove_one_of(&mut self, item: &BasketItem, retain: bool) {
        let Some(index) = self.position(&item.label) else {
            return;
        };
        let line = &mut self.display_items[index];
        if line.count > 1 {
            line.remove_one();
        } else if retain {
            line.count = 0;
        } else {
            self.display_items.remove(index);
        }
    }

    /// Removes up to `item.count` units from the matching line, flooring at zero.
    ///
    /// A drained line is removed unless `retain` is set.
    pub fn remove_items(&mut self, item: &BasketItem, retain: bool) {
        let Some(index) = self.position(&item.label) else {
            return;
        };
        let line = &mut self.display_items[index];
        line.count = line.count.saturating_sub(item.count);
        if line.count == 0 && !retain {
            self.display_items.remove(index);
        }
    }

    /// Applies [`Basket::remove_items`] for every line of `other`.
    pub fn remove_basket_items(&mut self, other: &Basket, retain: bool) {
        for item in &other.display_items {
            self.remove_items(item, retain);
        }
    }

    pub fn number_of_unique_items(&self) -> usize {
        self.display_items.len()
    }

    pub fn total_number_of_items(&self) -> u64 {
        self.display_items
            .iter()
            .map(|item| u64::from(item.count))
            .sum()
    }

    /// Sum of the line totals, saturating at the `i64` bounds.
    pub fn total_basket_value(&self) -> i64 {
        self.display_items
            .iter()
            .map(BasketItem::total_amount)
            .fold(0, i64::saturating_add)
    }

    pub fn clear_items(&mut self) {
        self.display_items.clear();
    }
}
