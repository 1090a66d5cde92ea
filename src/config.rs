use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    /// Meta webhook verification token (GET /webhook handshake).
    pub verify_token: String,
    /// App secret for X-Hub-Signature-256; empty = skip validation (dev mode).
    pub app_secret: String,
    pub whatsapp_token: String,
    pub whatsapp_api_url: String,
    pub phone_number_id: String,
    /// Pause between consecutive prompt units of one turn.
    pub send_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "agendabot.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            verify_token: env::var("VERIFY_TOKEN").unwrap_or_default(),
            app_secret: env::var("APP_SECRET").unwrap_or_default(),
            whatsapp_token: env::var("WHATSAPP_TOKEN").unwrap_or_default(),
            whatsapp_api_url: env::var("WHATSAPP_API_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com/v18.0".to_string()),
            phone_number_id: env::var("WHATSAPP_PHONE_NUMBER_ID").unwrap_or_default(),
            send_delay_ms: env::var("SEND_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        }
    }
}
