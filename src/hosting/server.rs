use super::*;
use crate::catalog::Catalog;
use crate::database;
use crate::database::Postgres;
use crate::registry::Registry;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run() -> Result<(), std::io::Error> {
        let reader = database::db().await;
        database::migrate(&reader).await.expect("schema migration");
        let catalog = Arc::new(
            Catalog::hydrate(reader.clone())
                .await
                .expect("catalog hydration"),
        );
        let writer = database::connect().await;
        let gateway = Arc::new(Postgres::new(reader.clone(), writer, catalog.clone()));
        let registry = web::Data::new(Registry::new(gateway.clone(), catalog));
        let gateway = web::Data::from(gateway);
        let client = web::Data::new(reader);
        log::info!("starting arena server");
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(registry.clone())
                .app_data(gateway.clone())
                .app_data(client.clone())
                .route("/health", web::get().to(handlers::health))
                .service(
                    web::scope("/arena/api")
                        .route("/players", web::get().to(handlers::players))
                        .route("/games/create", web::post().to(handlers::create))
                        .route("/games/pending", web::get().to(handlers::pending))
                        .route("/games/{id}/accept", web::post().to(handlers::accept))
                        .route("/games/{id}/decline", web::post().to(handlers::decline))
                        .route("/games/{id}/state", web::get().to(handlers::state))
                        .route(
                            "/games/{id}/units/{stack_id}/actions",
                            web::get().to(handlers::options),
                        )
                        .route("/games/{id}/move", web::post().to(handlers::submit))
                        .route("/games/{id}/surrender", web::post().to(handlers::surrender)),
                )
        })
        .workers(4)
        .bind(std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"))?
        .run()
        .await
    }
}
