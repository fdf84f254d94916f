use actix_web::{HttpResponse, Result, web};
use log::debug;

use crate::payloads::{ContentKind, ContentRequest};
use crate::qr::renderer::Artifact;
use crate::state::app_state::AppState;
use crate::structs::qr_request::RenderQuery;

/// Generate a QR code for `contentType` from the JSON body.
///
/// Text artifacts (Base64 data URI, SVG, ASCII) are returned as a JSON string,
/// Image and Pdf as raw bytes.
pub async fn generate_qr(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RenderQuery>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let kind = path.into_inner().parse::<ContentKind>()?;
    let content = ContentRequest::from_json(kind, &body)?;
    let render = query.into_inner().into_render_request()?;
    debug!("Generating {} code as {:?}", content.kind(), render.render_type);

    // Rasterising large symbols is CPU bound; keep it off the async workers.
    let generator = app_state.generator.clone();
    let artifact = web::block(move || generator.generate(&content, &render)).await??;

    Ok(match artifact {
        Artifact::Binary { bytes, mime } => HttpResponse::Ok().content_type(mime).body(bytes),
        text => HttpResponse::Ok().json(text.as_text()),
    })
}
