mod auth;
mod client;
mod error;
mod routes;

use std::str::FromStr;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;

use self::auth::TokenSecret;
use self::client::DataApi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let port = u16::from_str(&std::env::var("PORT").unwrap_or("5000".into()))
        .expect("Failed to parse $PORT!");
    let ip = std::net::IpAddr::from_str(&std::env::var("LISTEN_IP").unwrap_or("127.0.0.1".into()))
        .expect("Failed to parse $LISTEN_IP");
    let listen_addr = std::net::SocketAddr::new(ip, port);

    let secret = TokenSecret(std::env::var("JWT_SECRET").expect("JWT_SECRET must be set!"));
    let data_api_url =
        std::env::var("DATA_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5051".into());
    let api = DataApi::new(data_api_url);

    info!("Listening on {}", listen_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(api.clone()))
            .app_data(web::Data::new(secret.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(web::resource("/protected").route(web::get().to(routes::protected)))
            .service(web::resource("/drinks").route(web::get().to(routes::get_drinks)))
            .service(
                web::resource("/drinks/categories")
                    .route(web::get().to(routes::get_drink_categories)),
            )
            .service(web::resource("/producers").route(web::get().to(routes::get_producers)))
            .service(
                web::resource("/producers/{producer_id}")
                    .route(web::get().to(routes::get_producer)),
            )
            .service(
                web::resource("/favorites")
                    .route(web::post().to(routes::add_favorite))
                    .route(web::get().to(routes::get_favorites))
                    .route(web::delete().to(routes::remove_favorite)),
            )
            .service(
                web::resource("/recommendations")
                    .route(web::get().to(routes::get_recommendations)),
            )
            .service(web::resource("/top-rated").route(web::get().to(routes::get_top_rated)))
            .service(
                web::resource("/reviews")
                    .route(web::post().to(routes::add_review))
                    .route(web::get().to(routes::get_my_reviews)),
            )
            .service(
                web::resource("/reviews/drink/{drink_id}")
                    .route(web::get().to(routes::get_drink_reviews)),
            )
            .service(
                web::resource("/reviews/producer/{producer_id}")
                    .route(web::get().to(routes::get_producer_reviews)),
            )
            .service(
                web::resource("/reviews/{review_id}")
                    .route(web::delete().to(routes::delete_review)),
            )
            .service(
                web::resource("/producer-reviews")
                    .route(web::post().to(routes::add_producer_review))
                    .route(web::get().to(routes::get_my_producer_reviews)),
            )
            .service(
                web::resource("/producer-reviews/{review_id}")
                    .route(web::delete().to(routes::delete_producer_review)),
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(routes::get_profile))
                    .route(web::put().to(routes::update_profile)),
            )
    })
    .bind(listen_addr)?
    .run()
    .await
}
