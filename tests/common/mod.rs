#![allow(dead_code)]

use rand::Rng;
use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub const FLOWS_JSON: &str = r#"[
  {
    "name": "sale",
    "type": "sale",
    "requestClass": "payment",
    "stages": [
      {"name": "PRE_FLOW", "flowApps": [{"id": "loyalty", "conditionalOn": "loyaltyMember"}]},
      {"name": "PAYMENT_CARD_READING", "flowApps": [{"id": "reader", "mandatory": true, "delegateCancellationsTo": true}]},
      {"name": "POST_TRANSACTION", "flowApps": [{"id": "receipts"}, {"id": "loyalty"}]}
    ]
  },
  {
    "name": "refund",
    "type": "refund",
    "requestClass": "payment",
    "stages": [
      {"name": "PAYMENT_CARD_READING", "flowApps": [{"id": "reader", "mandatory": true}]}
    ]
  },
  {"name": "loyaltyBalance", "type": "showLoyaltyPoints", "requestClass": "generic", "stages": []},
  {"name": "sale", "type": "sale", "requestClass": "payment", "stages": []},
  {"type": "void", "requestClass": "payment", "stages": []}
]"#;

pub const SERVICES_JSON: &str = r#"[
  {"id": "loyalty", "vendor": "Example", "displayName": "Loyalty",
   "supportedStages": ["PRE_FLOW", "POST_TRANSACTION"], "supportedFlowTypes": ["sale"]},
  {"id": "reader", "vendor": "Example", "displayName": "Card Reader",
   "supportedStages": ["PAYMENT_CARD_READING"], "supportedCurrencies": ["GBP", "EUR"]},
  {"id": "receipts", "vendor": "Example", "displayName": "Receipts",
   "supportedStages": ["POST_TRANSACTION"]}
]"#;

pub fn write_temp(content: &str) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub fn flows_file() -> Result<NamedTempFile, Error> {
    write_temp(FLOWS_JSON)
}

pub fn services_file() -> Result<NamedTempFile, Error> {
    write_temp(SERVICES_JSON)
}

pub fn basket_file(rows: &[[&str; 3]]) -> Result<NamedTempFile, Error> {
    let file = NamedTempFile::new()?;
    let mut wtr = csv::WriterBuilder::new().from_path(file.path())?;
    wtr.write_record(["label", "count", "amount"])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(file)
}

/// Random additional amounts keyed from a small id pool so that keys overlap.
pub fn random_additional_amounts(rng: &mut impl Rng, max_value: u64) -> Vec<(String, u64)> {
    const IDS: [&str; 5] = ["tip", "cashback", "fee", "donation", "surcharge"];
    let count = rng.gen_range(0..=IDS.len());
    (0..count)
        .map(|_| {
            let id = IDS[rng.gen_range(0..IDS.len())].to_string();
            (id, rng.gen_range(0..=max_value))
        })
        .collect()
}
