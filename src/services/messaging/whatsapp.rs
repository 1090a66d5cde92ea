use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use crate::models::PromptUnit;

use super::PromptSender;

/// WhatsApp Cloud API sender. One POST per prompt unit to
/// `{api_url}/{phone_number_id}/messages`.
pub struct WhatsAppProvider {
    api_url: String,
    token: String,
    phone_number_id: String,
    client: reqwest::Client,
}

impl WhatsAppProvider {
    pub fn new(api_url: String, token: String, phone_number_id: String) -> Self {
        Self {
            api_url,
            token,
            phone_number_id,
            client: reqwest::Client::new(),
        }
    }

    fn payload(&self, to: &str, unit: &PromptUnit) -> serde_json::Value {
        match unit {
            PromptUnit::Text { body } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "text": { "body": body },
            }),
            PromptUnit::Choice { body, options, .. } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "interactive",
                "interactive": {
                    "type": "button",
                    "body": { "text": body },
                    "action": {
                        "buttons": options.iter().map(|opt| json!({
                            "type": "reply",
                            "reply": { "id": opt.id, "title": opt.title },
                        })).collect::<Vec<_>>(),
                    },
                },
            }),
            PromptUnit::List {
                header,
                body,
                footer,
                button,
                rows,
                ..
            } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "interactive",
                "interactive": {
                    "type": "list",
                    "header": { "type": "text", "text": header },
                    "body": { "text": body },
                    "footer": { "text": footer },
                    "action": {
                        "button": button,
                        "sections": [{
                            "title": header,
                            "rows": rows.iter().map(|row| json!({
                                "id": row.id,
                                "title": row.title,
                                "description": row.description,
                            })).collect::<Vec<_>>(),
                        }],
                    },
                },
            }),
        }
    }
}

#[async_trait]
impl PromptSender for WhatsAppProvider {
    async fn send(&self, to: &str, unit: &PromptUnit) -> anyhow::Result<()> {
        let url = format!("{}/{}/messages", self.api_url, self.phone_number_id);

        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&self.payload(to, unit))
            .send()
            .await
            .context("failed to send WhatsApp message")?
            .error_for_status()
            .context("WhatsApp API returned error")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChoiceOption, ListRow};

    fn provider() -> WhatsAppProvider {
        WhatsAppProvider::new(
            "https://graph.facebook.com/v18.0".to_string(),
            "token".to_string(),
            "12345".to_string(),
        )
    }

    #[test]
    fn test_choice_payload_shape() {
        let unit = PromptUnit::Choice {
            body: "elige".to_string(),
            options: vec![ChoiceOption {
                id: "horario_0".to_string(),
                title: "9:00 AM - 10:00 AM".to_string(),
            }],
            continuation: false,
        };
        let payload = provider().payload("555", &unit);
        assert_eq!(payload["interactive"]["type"], "button");
        assert_eq!(
            payload["interactive"]["action"]["buttons"][0]["reply"]["id"],
            "horario_0"
        );
    }

    #[test]
    fn test_list_payload_shape() {
        let unit = PromptUnit::List {
            header: "Servicios".to_string(),
            body: "elige".to_string(),
            footer: String::new(),
            button: "Ver".to_string(),
            rows: vec![ListRow {
                id: "servicio_0_9:00 AM - 10:00 AM".to_string(),
                title: "Corte de cabello".to_string(),
                description: String::new(),
            }],
            continuation: false,
        };
        let payload = provider().payload("555", &unit);
        assert_eq!(payload["interactive"]["type"], "list");
        assert_eq!(
            payload["interactive"]["action"]["sections"][0]["rows"][0]["title"],
            "Corte de cabello"
        );
    }
}
