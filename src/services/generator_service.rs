use std::sync::Arc;

use crate::errors::AppError;
use crate::payloads::ContentRequest;
use crate::qr::encoder::SymbolEncoder;
use crate::qr::renderer::{self, Artifact, RenderRequest};

/// Formatter -> encoder -> renderer. Each stage's error is returned as is.
#[derive(Clone)]
pub struct GenerationService {
    encoder: Arc<dyn SymbolEncoder>,
}

impl GenerationService {
    pub fn new(encoder: Arc<dyn SymbolEncoder>) -> Self {
        Self { encoder }
    }

    pub fn generate(
        &self,
        content: &ContentRequest,
        render: &RenderRequest,
    ) -> Result<Artifact, AppError> {
        let payload = content.to_payload()?;
        let options = content.encode_options()?;
        // Render options are checked once, before any encoding work.
        render.validate()?;
        let matrix = self.encoder.encode(&payload, &options)?;
        renderer::render(&matrix, render)
    }
}
