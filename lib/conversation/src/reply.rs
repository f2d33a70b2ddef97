//! Reply payload sent back to the webhook caller.

use serde::{Deserialize, Serialize};

/// What the caller receives for one message.
///
/// Serialized as `{"fulfillmentText": ..., "totalPrice": ...}` so the same
/// body works for a Dialogflow fulfillment webhook and a plain front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundReply {
    /// Text to show the user.
    pub fulfillment_text: String,
    /// Present only once the reservation is complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<u64>,
}

impl OutboundReply {
    /// A reply carrying only text.
    #[must_use]
    pub fn text(fulfillment_text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: fulfillment_text.into(),
            total_price: None,
        }
    }

    /// A reply carrying the final price.
    #[must_use]
    pub fn priced(fulfillment_text: impl Into<String>, total_price: u64) -> Self {
        Self {
            fulfillment_text: fulfillment_text.into(),
            total_price: Some(total_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_reply_omits_price() {
        let json = serde_json::to_value(OutboundReply::text("Hi")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "fulfillmentText": "Hi" }));
    }

    #[test]
    fn priced_reply_uses_camel_case() {
        let json = serde_json::to_value(OutboundReply::priced("Done", 400)).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "fulfillmentText": "Done", "totalPrice": 400 })
        );
    }
}
