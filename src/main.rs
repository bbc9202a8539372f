use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use log::info;

use geomind::knowledge::CLASS_COUNT;
use geomind::{handlers, AppState, Config, KnowledgeBase, ModelHost};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let knowledge = match &config.knowledge_base {
        Some(path) => KnowledgeBase::from_path(path)?,
        None => KnowledgeBase::builtin()?,
    };
    knowledge.ensure_class_count(CLASS_COUNT)?;
    info!("Knowledge base has {} rock classes", knowledge.len());

    let model = ModelHost::load(&config.model);
    let state = web::Data::new(
        AppState::new(model, knowledge).with_legacy_status_codes(config.legacy_status_codes),
    );
    let payload_limit = config.max_payload_bytes();

    info!("Server running at http://{}:{}", config.bind, config.port);

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .configure(handlers::configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind((config.bind.as_str(), config.port))?.run().await?;
    Ok(())
}
