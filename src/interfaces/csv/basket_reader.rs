use crate::domain::basket::{Basket, BasketItem};
use crate::error::{FlowError, Result};
use serde::Deserialize;
use std::io::Read;

/// One CSV row: `label, count, amount[, category]`. `amount` is the unit amount.
#[derive(Debug, Deserialize)]
struct BasketLine {
    label: String,
    count: u32,
    amount: i64,
    #[serde(default)]
    category: Option<String>,
}

impl From<BasketLine> for BasketItem {
    fn from(line: BasketLine) -> Self {
        let item = BasketItem::new(&line.label, line.count, line.amount);
        match line.category.as_deref() {
            Some(category) if !category.is_empty() => item.with_category(category),
            _ => item,
        }
    }
}

/// Reads basket lines from a CSV source.
pub struct BasketReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> BasketReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes the lines; a malformed row yields an error without
    /// stopping the stream.
    pub fn items(self) -> impl Iterator<Item = Result<BasketItem>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map(|line: BasketLine| BasketItem::from(line))
                .map_err(FlowError::from)
        })
    }

    /// Reads every line into a basket, merging lines that share a label.
    pub fn read_basket(self) -> Result<Basket> {
        let mut basket = Basket::new();
        for item in self.items() {
            basket.add_item_merge(item?);
        }
        Ok(basket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "label, count, amount, category\nCoffee, 2, 250, drinks\nDiscount, 1, -100,";
        let items: Vec<Result<BasketItem>> = BasketReader::new(data.as_bytes()).items().collect();

        assert_eq!(items.len(), 2);
        let coffee = items[0].as_ref().unwrap();
        assert_eq!(coffee.label, "Coffee");
        assert_eq!(coffee.total_amount(), 500);
        assert_eq!(coffee.category.as_deref(), Some("drinks"));

        let discount = items[1].as_ref().unwrap();
        assert_eq!(discount.amount, -100);
        assert!(discount.category.is_none());
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "label, count, amount\nCoffee, -2, 250\nTea, 1, 180";
        let items: Vec<Result<BasketItem>> = BasketReader::new(data.as_bytes()).items().collect();

        assert!(matches!(items[0], Err(FlowError::CsvError(_))));
        assert!(items[1].is_ok());
    }

    #[test]
    fn test_read_basket_merges_labels() {
        let data = "label, count, amount\nCoffee, 1, 250\nTea, 1, 180\nCoffee, 2, 250";
        let basket = BasketReader::new(data.as_bytes()).read_basket().unwrap();

        assert_eq!(basket.number_of_unique_items(), 2);
        assert_eq!(basket.get_item("Coffee").unwrap().count, 3);
        assert_eq!(basket.total_basket_value(), 930);
    }
}
