use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::ocr::OcrEngine;
use crate::uploads::UploadTracker;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ocr: Arc<dyn OcrEngine>,
    pub uploads: UploadTracker,
}

impl AppState {
    pub fn new(config: Config, ocr: Arc<dyn OcrEngine>) -> Self {
        let uploads = UploadTracker::new(
            config.uploads.folder.clone(),
            Duration::from_secs(config.uploads.cleanup_delay_secs),
        );

        Self {
            config: Arc::new(config),
            ocr,
            uploads,
        }
    }
}
