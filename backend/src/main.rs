use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use report_engine::config::{Config, DEFAULT_CONFIG_FILE};
use report_engine::job_controller::state::{self, JobsState};
use report_engine::repository::SqliteReportRepository;
use report_engine::services::engine::ReportEngine;
use report_engine::services::pdf::GenpdfBackend;
use report_engine::services::renderer::Renderer;
use report_engine::services::reports::{self, SharedEngine};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

fn build_engine(config: &Config) -> Result<SharedEngine, Box<dyn std::error::Error>> {
    let repository = SqliteReportRepository::new(&config.database_path);
    repository.initialize_schema()?;
    if config.seed_sample {
        repository.seed_sample()?;
    }

    let backend = GenpdfBackend::new(
        &config.fonts_directory,
        &config.font_family,
        &config.fallback_font_family,
    );
    Ok(Arc::new(ReportEngine::new(
        repository,
        backend,
        Renderer::new(config.sanitize),
        &config.output_directory,
    )))
}

/// Generates one report and maps the outcome to the process exit status.
async fn run_once(engine: SharedEngine, template_name: String) -> ExitCode {
    info!("Generating report: {}", template_name);
    let result = tokio::task::spawn_blocking(move || engine.generate_report(&template_name)).await;
    match result {
        Ok(Ok(path)) => {
            info!("Report generated: {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!("Report generation failed: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Report task aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: &Config, engine: SharedEngine) -> std::io::Result<()> {
    let (jobs_state, rx) = JobsState::new(100);
    tokio::spawn(state::start_job_updater(jobs_state.jobs.clone(), rx));

    info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(engine.clone()))
            .service(reports::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> ExitCode {
    let config = match Config::load(Path::new(DEFAULT_CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    env_logger::init_from_env(Env::default().default_filter_or(config.log_filter.as_str()));

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match std::env::args().nth(1) {
        Some(template_name) => run_once(engine, template_name).await,
        None => match serve(&config, engine).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Server error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
