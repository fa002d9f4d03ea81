mod api;
mod config;
mod database;
mod error;
mod films;
mod model;
mod users;
mod validation;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use database::Stores;
use films::FilmService;
use log::info;
use users::UserService;

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("filmorate=debug,actix_web=info"),
    )
    .init();

    let config = Config::from_env();
    info!("starting with {:?}", config);

    // Everything lives in a temporary database and is gone on shutdown.
    let stores = Stores::temporary()?;
    let films = web::Data::new(FilmService::new(
        stores.films.clone(),
        stores.users.clone(),
    ));
    let users = web::Data::new(UserService::new(stores.users));

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(films.clone())
            .app_data(users.clone())
            .configure(api::configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }
    server.bind(config.http_addr)?.run().await
}
