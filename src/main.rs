use actix_cors::Cors;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use rust_lms_next::config::AppConfig;
use rust_lms_next::models::AppStartTime;
use rust_lms_next::routes;
use rust_lms_next::runtime::lifetime;
use rust_lms_next::runtime::lifetime::startup::StartupContext;
use rust_lms_next::utils::{json_error_handler, path_error_handler, query_error_handler};

// 开发环境输出带源码位置的彩色日志，其余环境输出 JSON
fn init_tracing(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .with_writer(writer)
        .with_level(true);

    if config.is_development() {
        builder
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        builder.json().init();
    }
    guard
}

fn build_app(
    config: &'static AppConfig,
    ctx: &StartupContext,
    started: &AppStartTime,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .wrap(
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(config.cors.max_age),
        )
        .wrap(Compress::default())
        .wrap(
            DefaultHeaders::new()
                .add((
                    "Keep-Alive",
                    format!("timeout={}", config.server.timeouts.keep_alive),
                ))
                .add(("Cache-Control", "no-store")),
        )
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::PayloadConfig::new(config.server.limits.max_payload_size))
        .app_data(web::Data::new(ctx.storage.clone()))
        .app_data(web::Data::new(ctx.notifications.clone()))
        .app_data(web::Data::new(ctx.assignments.clone()))
        .app_data(web::Data::new(ctx.submissions.clone()))
        .app_data(web::Data::new(ctx.reports.clone()))
        .app_data(web::Data::new(ctx.classes.clone()))
        .app_data(web::Data::new(started.clone()))
        .configure(routes::configure_api_routes)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    setup_panic!();

    let started = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    if let Err(e) = AppConfig::init() {
        eprintln!("Failed to initialize configuration: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::get();
    let _log_guard = init_tracing(config);

    warn!(
        "Starting {} v{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.system_name
    );

    let mut ctx = match lifetime::startup::prepare_server_startup().await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    // 后台维护任务与 HTTP 服务共用同一个运行时
    let scheduler_handle = ctx.scheduler.take().map(|s| tokio::spawn(s.run()));

    info!(
        "Pre-startup processing completed in {} ms",
        (chrono::Utc::now() - started.start_datetime).num_milliseconds()
    );

    let server = HttpServer::new(move || build_app(config, &ctx, &started))
        .keep_alive(Duration::from_secs(config.server.timeouts.keep_alive))
        .client_request_timeout(Duration::from_millis(config.server.timeouts.client_request))
        .client_disconnect_timeout(Duration::from_millis(
            config.server.timeouts.client_disconnect,
        ))
        .workers(config.server.workers);

    #[cfg(unix)]
    let server = match config.unix_socket_path() {
        Some(socket_path) => {
            warn!("Listening on unix socket {}", socket_path);
            if std::path::Path::new(socket_path).exists() {
                std::fs::remove_file(socket_path)?;
            }
            server.bind_uds(socket_path)?
        }
        None => {
            warn!("Listening on http://{}", config.server_bind_address());
            server.bind(config.server_bind_address())?
        }
    };

    #[cfg(not(unix))]
    let server = {
        warn!("Listening on http://{}", config.server_bind_address());
        server.bind(config.server_bind_address())?
    };

    warn!("Using {} worker threads", config.server.workers);

    let result = tokio::select! {
        res = server.run() => res,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Shutdown signal received");
            Ok(())
        }
    };

    if let Some(handle) = scheduler_handle {
        handle.abort();
        warn!("Maintenance scheduler stopped");
    }

    result
}
