use actix_web::{dev::Server, middleware, web, App, HttpServer};
use log::info;

use crate::{
    controller::{balance, claim, fees, health, json_error_handler, pool_by_mint, pools, tokens},
    state::State,
};

/// Register every API route under `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(balance::index)
            .service(tokens::index)
            .service(pools::index)
            .service(pool_by_mint::index)
            .service(fees::index)
            .service(claim::partner)
            .service(claim::creator)
            .service(health::index),
    );
}

pub fn init_server(state: State) -> std::io::Result<Server> {
    let host = state.config.server_host.to_owned();
    let port = state.config.server_port;
    let state = web::Data::new(state);

    info!("Listening on {}:{}", host, port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(4096)
                    .error_handler(json_error_handler),
            )
            .configure(configure)
    })
    .bind((host, port))?
    .disable_signals()
    .run();
    Ok(server)
}
