use actix_web::web;

use crate::errors::AppError;
use crate::handlers::health_handlers::health_check;
use crate::handlers::qr_handlers::generate_qr;
use crate::handlers::record_handlers::{
    create_record, delete_record, get_record, list_records, update_record,
};
use crate::middlewares::authmw::JwtAuth;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    // Malformed bodies and query strings are validation errors
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );

    // Identity is optional at the scope level; owner-scoped handlers demand it
    cfg.service(
        web::scope("/api")
            .wrap(JwtAuth::new(jwt_secret))
            .route("/health/check", web::get().to(health_check))
            .route("/generate/{content_type}", web::post().to(generate_qr))
            .service(
                web::resource("/records")
                    .route(web::post().to(create_record))
                    .route(web::get().to(list_records)),
            )
            .service(
                web::resource("/records/{id}")
                    .route(web::get().to(get_record))
                    .route(web::put().to(update_record))
                    .route(web::delete().to(delete_record)),
            ),
    );
}
