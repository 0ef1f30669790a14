use std::sync::Arc;
use crate::config::AppConfig;
use crate::service::compose::Composer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub composer: Arc<Composer>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        // 所有外呼共享一个连接池
        let http = reqwest::Client::new();
        let composer = Arc::new(Composer::new(http, config.clone()));

        Self { config, composer }
    }
}
