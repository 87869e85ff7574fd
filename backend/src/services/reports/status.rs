use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/reports/status/{job_id}`: the job's `JobStatus` as JSON, `404`
/// for unknown ids.
pub(crate) async fn process(
    job_id: web::Path<String>,
    jobs: web::Data<JobsState>,
) -> impl Responder {
    match jobs.status(&job_id.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}
