//! Aliased Card Types
//!
//! The vault hands out opaque aliases in place of the real PAN and CVC. This
//! module models the aliased card and the JSON:API-style wire shape the
//! collect flow posts back, and validates both before any network call.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// A card whose sensitive fields have been replaced by vault aliases.
///
/// The aliases are opaque tokens. Nothing in this crate decodes or inspects
/// them; they travel as literal field values and the outbound proxy swaps in
/// the real values before the request reaches the PSP network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AliasedCard {
    /// Alias standing in for the primary account number
    pub pan_alias: String,

    /// Alias standing in for the card verification code
    pub cvc_alias: String,

    /// Expiry month (1-12)
    pub exp_month: u8,

    /// Expiry year, two- or four-digit
    pub exp_year: u16,

    /// Identifier assigned by the vaulting system
    pub card_id: String,
}

impl AliasedCard {
    /// Reject malformed input before any network call is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.pan_alias.trim().is_empty() {
            return Err(GatewayError::Validation("pan_alias is required".into()));
        }
        if self.cvc_alias.trim().is_empty() {
            return Err(GatewayError::Validation("cvc_alias is required".into()));
        }
        if !(1..=12).contains(&self.exp_month) {
            return Err(GatewayError::Validation(format!(
                "exp_month must be 1-12, got {}",
                self.exp_month
            )));
        }
        // Two-digit (24) and four-digit (2024) years are both accepted.
        if !(1..=99).contains(&self.exp_year) && !(2000..=2099).contains(&self.exp_year) {
            return Err(GatewayError::Validation(format!(
                "exp_year out of range: {}",
                self.exp_year
            )));
        }
        Ok(())
    }
}

/// Inbound wire shape produced by the vault's collect SDK:
/// `{"data": {"id": ..., "attributes": {...}}}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardObject {
    pub data: CardData,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardData {
    /// Vault-assigned card identifier
    pub id: String,

    pub attributes: CardAttributes,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardAttributes {
    pub pan_alias: String,
    pub cvc_alias: String,
    pub exp_month: u8,
    pub exp_year: u16,
}

impl CardObject {
    /// Flatten the wire shape into the internal card type.
    pub fn into_aliased_card(self) -> AliasedCard {
        AliasedCard {
            pan_alias: self.data.attributes.pan_alias,
            cvc_alias: self.data.attributes.cvc_alias,
            exp_month: self.data.attributes.exp_month,
            exp_year: self.data.attributes.exp_year,
            card_id: self.data.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> AliasedCard {
        AliasedCard {
            pan_alias: "tok_sandbox_8rVSERS1WKtC2H3a2mJABY".into(),
            cvc_alias: "tok_sandbox_t3TqVDEgkkhofo8BA6xraz".into(),
            exp_month: 12,
            exp_year: 2034,
            card_id: "card_abc123".into(),
        }
    }

    #[test]
    fn test_valid_card_passes() {
        assert!(sample_card().validate().is_ok());
    }

    #[test]
    fn test_empty_alias_rejected() {
        let mut card = sample_card();
        card.pan_alias = "  ".into();
        assert!(matches!(
            card.validate(),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_month_bounds() {
        let mut card = sample_card();
        card.exp_month = 0;
        assert!(card.validate().is_err());
        card.exp_month = 13;
        assert!(card.validate().is_err());
        card.exp_month = 1;
        assert!(card.validate().is_ok());
    }

    #[test]
    fn test_two_digit_year_accepted() {
        let mut card = sample_card();
        card.exp_year = 34;
        assert!(card.validate().is_ok());
        card.exp_year = 150;
        assert!(card.validate().is_err());
    }

    #[test]
    fn test_card_object_flattens() {
        let json = serde_json::json!({
            "data": {
                "id": "card_xyz",
                "attributes": {
                    "pan_alias": "tok_pan",
                    "cvc_alias": "tok_cvc",
                    "exp_month": 3,
                    "exp_year": 2030
                }
            }
        });
        let object: CardObject = serde_json::from_value(json).unwrap();
        let card = object.into_aliased_card();
        assert_eq!(card.card_id, "card_xyz");
        assert_eq!(card.pan_alias, "tok_pan");
        assert_eq!(card.exp_month, 3);
    }
}
