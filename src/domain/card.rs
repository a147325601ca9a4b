use crate::domain::messages::AdditionalData;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

const MIN_PAN_LENGTH: usize = 16;
const START_PAN_OFFSET: usize = 6;
const END_PAN_OFFSET: usize = 4;
const MASK_CHAR: char = 'X';

/// Masks a PAN according to PCI DSS: every digit except the first six and
/// the last four is replaced with `X`.
///
/// PANs shorter than 16 characters are rejected.
pub fn mask_pan(pan: &str) -> Result<String> {
    let length = pan.chars().count();
    if length < MIN_PAN_LENGTH {
        return Err(FlowError::ValidationError(format!(
            "PAN must be >= {} in length",
            MIN_PAN_LENGTH
        )));
    }
    Ok(pan
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i >= START_PAN_OFFSET && i < length - END_PAN_OFFSET {
                MASK_CHAR
            } else {
                c
            }
        })
        .collect())
}

/// Token generated for a card, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub value: String,
    pub source: String,
}

/// Details of the card presented during card reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    masked_pan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cardholder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    card_token: Option<Token>,
    #[serde(default)]
    additional_data: AdditionalData,
}

impl Card {
    /// A card without any details.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn masked_pan(&self) -> Option<&str> {
        self.masked_pan.as_deref()
    }

    pub fn cardholder_name(&self) -> Option<&str> {
        self.cardholder_name.as_deref()
    }

    /// Expiry in `YYMM` format.
    pub fn expiry_date(&self) -> Option<&str> {
        self.expiry_date.as_deref()
    }

    pub fn card_token(&self) -> Option<&Token> {
        self.card_token.as_ref()
    }

    pub fn additional_data(&self) -> &AdditionalData {
        &self.additional_data
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }
}

/// Everything needed to describe a card. Validated once by [`CardConfig::build`].
#[derive(Debug, Clone, Default)]
pub struct CardConfig {
    /// Must already be masked; see [`mask_pan`].
    pub masked_pan: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiry_date: Option<String>,
    pub card_token: Option<Token>,
    pub additional_data: AdditionalData,
}

impl CardConfig {
    pub fn build(self) -> Result<Card> {
        if let Some(expiry) = &self.expiry_date {
            validate_expiry(expiry)?;
        }
        Ok(Card {
            masked_pan: self.masked_pan,
            cardholder_name: self.cardholder_name,
            expiry_date: self.expiry_date,
            card_token: self.card_token,
            additional_data: self.additional_data,
        })
    }
}

fn validate_expiry(expiry: &str) -> Result<()> {
    let malformed = || {
        FlowError::ValidationError(format!(
            "Expiry date must be in format YYMM, got '{}'",
            expiry
        ))
    };
    if expiry.len() != 4 || !expiry.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    let month: u8 = expiry[2..].parse().map_err(|_| malformed())?;
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(malformed())
    }
}
