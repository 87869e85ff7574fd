use crate::services::reports::{error_response, SharedEngine};
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/reports/validate/{template_name}`: `200` with
/// `{ template, valid, errors }`, `404` when the template is missing.
pub(crate) async fn process(
    template_name: web::Path<String>,
    engine: web::Data<SharedEngine>,
) -> impl Responder {
    let name = template_name.into_inner();
    let engine = engine.get_ref().clone();
    let lookup = name.clone();

    match web::block(move || engine.validate_template(&lookup)).await {
        Ok(Ok(errors)) => HttpResponse::Ok().json(serde_json::json!({
            "template": name,
            "valid": errors.is_empty(),
            "errors": errors,
        })),
        Ok(Err(e)) => error_response(&e),
        Err(e) => HttpResponse::InternalServerError().body(format!("Validation aborted: {}", e)),
    }
}
