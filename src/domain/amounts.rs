use crate::error::{FlowError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An ISO-4217 style currency code.
///
/// Only the shape is enforced (exactly three characters); whether the code is
/// a real currency is up to the payment services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.chars().count() == 3 {
            Ok(Self(code))
        } else {
            Err(FlowError::ValidationError(format!(
                "Currency must be a 3 character code, got '{}'",
                code
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Currency {
    type Error = FlowError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Currency {
    type Error = FlowError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single amount value in minor units with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    value: u64,
    currency: Currency,
}

impl Amount {
    pub fn new(value: u64, currency: &str) -> Result<Self> {
        Ok(Self {
            value,
            currency: Currency::new(currency)?,
        })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}

/// All the amounts relevant for a transaction.
///
/// The base amount is inclusive of tax. Additional amounts such as "tip" or
/// "cashback" are keyed by case-sensitive identifiers. All values are in the
/// currency subunit (cents, pence, etc).
///
/// Any operation combining two `Amounts` requires them to share a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AmountsDocument", into = "AmountsDocument")]
pub struct Amounts {
    base_amount: u64,
    currency: Currency,
    additional_amounts: BTreeMap<String, u64>,
    currency_exchange_rate: Option<Decimal>,
    original_currency: Option<Currency>,
}

impl Amounts {
    pub fn new(base_amount: u64, currency: &str) -> Result<Self> {
        Self::with_additional_amounts(base_amount, currency, BTreeMap::new())
    }

    pub fn with_additional_amounts(
        base_amount: u64,
        currency: &str,
        additional_amounts: BTreeMap<String, u64>,
    ) -> Result<Self> {
        Ok(Self {
            base_amount,
            currency: Currency::new(currency)?,
            additional_amounts,
            currency_exchange_rate: None,
            original_currency: None,
        })
    }

    /// Sets an additional amount. The last write for an identifier wins.
    pub fn add_additional_amount(&mut self, identifier: &str, amount: u64) -> Result<()> {
        if identifier.is_empty() {
            return Err(FlowError::ValidationError(
                "Additional amount identifier must be set".to_string(),
            ));
        }
        self.additional_amounts.insert(identifier.to_string(), amount);
        Ok(())
    }

    /// Sets an additional amount as a fraction (0.0 to 1.0) of the base amount.
    ///
    /// The stored value is `floor(base * fraction)`. Useful for fees or charity
    /// contributions expressed as a percentage.
    pub fn add_additional_amount_as_base_fraction(
        &mut self,
        identifier: &str,
        fraction: Decimal,
    ) -> Result<()> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(FlowError::ValidationError(
                "Fraction must be between 0.0 and 1.0".to_string(),
            ));
        }
        let value = Decimal::from(self.base_amount)
            .checked_mul(fraction)
            .and_then(|v| v.floor().to_u64())
            .ok_or_else(|| {
                FlowError::ValidationError("Fractional amount out of range".to_string())
            })?;
        self.add_additional_amount(identifier, value)
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn base_amount_value(&self) -> u64 {
        self.base_amount
    }

    pub fn base_amount(&self) -> Amount {
        Amount {
            value: self.base_amount,
            currency: self.currency.clone(),
        }
    }

    pub fn has_additional_amount(&self, identifier: &str) -> bool {
        self.additional_amounts.contains_key(identifier)
    }

    /// Returns 0 when no amount is set for the identifier.
    pub fn additional_amount_value(&self, identifier: &str) -> u64 {
        self.additional_amounts
            .get(identifier)
            .copied()
            .unwrap_or_default()
    }

    pub fn additional_amount(&self, identifier: &str) -> Amount {
        Amount {
            value: self.additional_amount_value(identifier),
            currency: self.currency.clone(),
        }
    }

    pub fn additional_amounts(&self) -> &BTreeMap<String, u64> {
        &self.additional_amounts
    }

    /// Base plus every additional amount.
    pub fn total_amount_value(&self) -> u64 {
        self.additional_amounts
            .values()
            .fold(self.base_amount, |total, v| total.saturating_add(*v))
    }

    /// Base plus the additional amounts whose identifiers are not listed.
    ///
    /// Handy when an environment supports some additionals natively (tip,
    /// cashback) and the rest must be folded into the base it is sent.
    pub fn total_excluding_amounts(&self, identifiers: &[&str]) -> u64 {
        self.additional_amounts
            .iter()
            .filter(|(key, _)| !identifiers.contains(&key.as_str()))
            .fold(self.base_amount, |total, (_, v)| total.saturating_add(*v))
    }

    pub fn total_amount(&self) -> Amount {
        Amount {
            value: self.total_amount_value(),
            currency: self.currency.clone(),
        }
    }

    /// Exchange rate from the original currency, if these amounts were converted.
    pub fn currency_exchange_rate(&self) -> Option<Decimal> {
        self.currency_exchange_rate
    }

    pub fn original_currency(&self) -> Option<&Currency> {
        self.original_currency.as_ref()
    }

    /// Converts every value into `to_currency` using `rate`, flooring each result.
    ///
    /// The original currency and the cumulative exchange rate are recorded on
    /// the returned amounts.
    pub fn convert(&self, to_currency: &str, rate: Decimal) -> Result<Amounts> {
        if rate <= Decimal::ZERO {
            return Err(FlowError::ValidationError(
                "Exchange rate must be positive".to_string(),
            ));
        }
        let currency = Currency::new(to_currency)?;
        if currency == self.currency {
            return Err(FlowError::ValidationError(format!(
                "Amounts are already in {}",
                currency
            )));
        }

        let apply = |value: u64| {
            Decimal::from(value)
                .checked_mul(rate)
                .and_then(|v| v.floor().to_u64())
                .ok_or_else(|| FlowError::ValidationError("Converted amount out of range".to_string()))
        };

        let currency_exchange_rate = match self.currency_exchange_rate {
            Some(previous) => previous.checked_mul(rate).ok_or_else(|| {
                FlowError::ValidationError("Cumulative exchange rate out of range".to_string())
            })?,
            None => rate,
        };

        let mut additional_amounts = BTreeMap::new();
        for (key, value) in &self.additional_amounts {
            additional_amounts.insert(key.clone(), apply(*value)?);
        }

        Ok(Amounts {
            base_amount: apply(self.base_amount)?,
            currency,
            additional_amounts,
            currency_exchange_rate: Some(currency_exchange_rate),
            original_currency: Some(
                self.original_currency
                    .clone()
                    .unwrap_or_else(|| self.currency.clone()),
            ),
        })
    }

    /// Adds two amounts together.
    ///
    /// Bases are summed and additional amounts are unioned, summing values for
    /// identifiers present in both.
    pub fn add_amounts(a1: &Amounts, a2: &Amounts) -> Result<Amounts> {
        check_same_currency(a1, a2)?;
        let base_amount = a1
            .base_amount
            .checked_add(a2.base_amount)
            .ok_or_else(overflow)?;

        let mut additional_amounts = a1.additional_amounts.clone();
        for (key, value) in &a2.additional_amounts {
            let entry = additional_amounts.entry(key.clone()).or_insert(0);
            *entry = entry.checked_add(*value).ok_or_else(overflow)?;
        }

        Ok(Amounts {
            base_amount,
            currency: a1.currency.clone(),
            additional_amounts,
            currency_exchange_rate: None,
            original_currency: None,
        })
    }

    /// Subtracts `a2` from `a1`, never going below zero.
    ///
    /// The result only contains additional amounts defined in `a1`. Identifiers
    /// that only exist in `a2` are ignored. A shared identifier that reaches
    /// zero is dropped unless `keep_zero_amount_additionals` is set.
    pub fn subtract_amounts(
        a1: &Amounts,
        a2: &Amounts,
        keep_zero_amount_additionals: bool,
    ) -> Result<Amounts> {
        check_same_currency(a1, a2)?;
        let base_amount = a1.base_amount.saturating_sub(a2.base_amount);

        let mut additional_amounts = a1.additional_amounts.clone();
        for (key, value) in &a2.additional_amounts {
            if let Some(current) = additional_amounts.get(key).copied() {
                let remainder = current.saturating_sub(*value);
                if remainder > 0 || keep_zero_amount_additionals {
                    additional_amounts.insert(key.clone(), remainder);
                } else {
                    additional_amounts.remove(key);
                }
            }
        }

        Ok(Amounts {
            base_amount,
            currency: a1.currency.clone(),
            additional_amounts,
            currency_exchange_rate: None,
            original_currency: None,
        })
    }
}

fn check_same_currency(a1: &Amounts, a2: &Amounts) -> Result<()> {
    if a1.currency == a2.currency {
        Ok(())
    } else {
        Err(FlowError::ValidationError(format!(
            "Trying to combine different currencies: {} and {}",
            a1.currency, a2.currency
        )))
    }
}

fn overflow() -> FlowError {
    FlowError::ValidationError("Amount overflow".to_string())
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmountsDocument {
    base_amount: u64,
    currency: String,
    #[serde(default)]
    additional_amounts: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_exchange_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_currency: Option<String>,
    #[serde(default, skip_deserializing)]
    total_amount: u64,
}

impl TryFrom<AmountsDocument> for Amounts {
    type Error = FlowError;

    fn try_from(doc: AmountsDocument) -> Result<Self> {
        Ok(Self {
            base_amount: doc.base_amount,
            currency: Currency::new(doc.currency)?,
            additional_amounts: doc.additional_amounts,
            currency_exchange_rate: doc.currency_exchange_rate,
            original_currency: doc.original_currency.map(Currency::new).transpose()?,
        })
    }
}

impl From<Amounts> for AmountsDocument {
    fn from(amounts: Amounts) -> Self {
        Self {
            total_amount: amounts.total_amount_value(),
            base_amount: amounts.base_amount,
            currency: amounts.currency.into(),
            additional_amounts: amounts.additional_amounts,
            currency_exchange_rate: amounts.currency_exchange_rate,
            original_currency: amounts.original_currency.map(String::from),
        }
    }
}
