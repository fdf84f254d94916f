use std::sync::Arc;

use crate::db::records::RecordStore;
use crate::qr::encoder::SymbolEncoder;
use crate::services::generator_service::GenerationService;
use crate::services::record_service::RecordService;

/// Services shared by every worker, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub generator: GenerationService,
    pub records: RecordService,
}

impl AppState {
    pub fn new(encoder: Arc<dyn SymbolEncoder>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            generator: GenerationService::new(encoder),
            records: RecordService::new(store),
        }
    }
}
