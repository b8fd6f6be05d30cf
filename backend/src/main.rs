use actix_web::{middleware, web, App, HttpServer};
use edustream_backend::config::AppConfig;
use edustream_backend::state::AppState;
use edustream_backend::{assistant, configure_services, db};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    db::init(&config.database_path).map_err(std::io::Error::other)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let assistant = assistant::from_config(&config);
    let (host, port) = config.bind_address();
    let state = web::Data::new(AppState::new(config, assistant));

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_services)
    })
    .bind((host, port))?
    .run()
    .await
}
