use std::sync::Arc;

use crate::config::Config;
use crate::notify::Notifier;
use crate::store::SubmissionLog;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub store: SubmissionLog,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let store = SubmissionLog::new(config.submissions_file.clone());
        Self {
            config,
            store,
            notifier,
        }
    }
}
