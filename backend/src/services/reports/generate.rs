//! # Report Generation Job
//!
//! `POST /api/reports/generate` registers a job as `Pending`, answers with
//! its id, and runs the pipeline on the blocking pool. The job moves to
//! `InProgress(0)`, then to `Completed(path)` or `Failed(message)`.
//!
//! The pipeline runs as one blocking call with no intermediate checkpoints,
//! so `InProgress(0)` only marks that a worker has picked the job up.

use crate::job_controller::state::JobsState;
use crate::services::reports::SharedEngine;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::requests::GenerateReportRequest;
use log::info;

pub(crate) async fn process(
    jobs: web::Data<JobsState>,
    engine: web::Data<SharedEngine>,
    payload: web::Json<GenerateReportRequest>,
) -> impl Responder {
    let job_id = schedule_report_job(
        jobs.get_ref().clone(),
        engine.get_ref().clone(),
        payload.into_inner().template_name,
    )
    .await;
    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}

/// Registers the job and spawns the task that drives it.
pub(crate) async fn schedule_report_job(
    jobs: JobsState,
    engine: SharedEngine,
    template_name: String,
) -> String {
    let job_id = jobs.register().await;
    info!("Report job {} scheduled for template {}", job_id, template_name);

    let id = job_id.clone();
    tokio::spawn(async move {
        jobs.report(&id, JobStatus::InProgress(0)).await;

        let handle =
            tokio::task::spawn_blocking(move || engine.generate_report(&template_name));

        let status = match handle.await {
            Ok(Ok(path)) => JobStatus::Completed(path.display().to_string()),
            Ok(Err(e)) => JobStatus::Failed(e.to_string()),
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        jobs.report(&id, status).await;
    });

    job_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reports::configure_routes;
    use crate::services::reports::tests::seeded_engine;
    use actix_web::{test, App};

    async fn final_status(
        rx: &mut tokio::sync::mpsc::Receiver<crate::job_controller::state::JobUpdate>,
        job_id: &str,
    ) -> JobStatus {
        let started = rx.recv().await.unwrap();
        assert_eq!(started.job_id, job_id);
        assert_eq!(started.status, JobStatus::InProgress(0));

        let finished = rx.recv().await.unwrap();
        assert_eq!(finished.job_id, job_id);
        finished.status
    }

    #[actix_web::test]
    async fn unknown_template_job_ends_failed() {
        let (_dir, _repo, engine) = seeded_engine();
        let (jobs, mut rx) = JobsState::new(8);

        let id = schedule_report_job(jobs.clone(), engine, "Missing".to_string()).await;
        assert_eq!(jobs.status(&id).await, Some(JobStatus::Pending));

        match final_status(&mut rx, &id).await {
            JobStatus::Failed(message) => assert!(message.contains("'Missing' not found")),
            other => panic!("expected a failed job, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn paint_failure_ends_failed_with_the_file_name() {
        let (_dir, _repo, engine) = seeded_engine();
        let (jobs, mut rx) = JobsState::new(8);

        let id = schedule_report_job(jobs.clone(), engine, "RelatorioVendas".to_string()).await;

        match final_status(&mut rx, &id).await {
            JobStatus::Failed(message) => {
                assert!(message.contains("RelatorioVendas_"));
                assert!(message.contains("no usable font family"));
            }
            other => panic!("expected a failed job, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn generate_route_answers_with_a_pending_job() {
        let (_dir, _repo, engine) = seeded_engine();
        let (jobs, _rx) = JobsState::new(8);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(engine))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/reports/generate")
            .set_json(serde_json::json!({ "template_name": "RelatorioVendas" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let job_id = body["job_id"].as_str().unwrap().to_string();

        // No updater runs here, so the map keeps the registered status.
        let req = test::TestRequest::get()
            .uri(&format!("/api/reports/status/{}", job_id))
            .to_request();
        let status: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status, serde_json::json!("Pending"));
    }
}
