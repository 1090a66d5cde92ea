use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::services::messaging::PromptSender;
use crate::store::AppointmentStore;

pub struct AppState {
    pub store: Arc<dyn AppointmentStore>,
    pub catalog: Arc<Catalog>,
    pub config: AppConfig,
    pub messaging: Box<dyn PromptSender>,
}
