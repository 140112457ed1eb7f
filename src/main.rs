use actix_cors::Cors;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, HttpServer};
use tracing_actix_web::TracingLogger;

use video_api::config::Config;
use video_api::error::StartupError;
use video_api::telemetry::init_logger_once;
use video_api::{build_resolver, build_store, configure};

fn cors(origin: Option<&str>) -> Cors {
    match origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials(),
        None => Cors::permissive(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logger_once();

    let startup = Config::from_env()
        .map_err(StartupError::from)
        .and_then(|config| {
            let store = build_store(&config)?;
            let resolver = build_resolver(&config, store.as_ref())?;
            Ok((config, store, resolver))
        });

    let (config, store, resolver) = match startup {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Server could not start: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let bind = config.bind_address();
    tracing::info!(host = %bind.0, port = bind.1, "Server is running");

    let cors_origin = config.cors_origin.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(cors(cors_origin.as_deref()))
            .wrap(TracingLogger::default())
            .configure(configure(store.clone(), resolver.clone()))
    })
        .bind(bind)?
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
