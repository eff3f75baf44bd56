mod catalog;
mod error;
mod favorites;
mod models;
mod ranking;
mod recommend;
mod reviews;
mod store;
mod users;

use std::path::PathBuf;
use std::str::FromStr;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;

use self::store::Store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    // Read the port on which to listen.
    let port = u16::from_str(&std::env::var("PORT").unwrap_or("5051".into()))
        .expect("Failed to parse $PORT!");

    // Read the IP address on which to listen
    let ip = std::net::IpAddr::from_str(&std::env::var("LISTEN_IP").unwrap_or("127.0.0.1".into()))
        .expect("Failed to parse $LISTEN_IP");

    let listen_addr = std::net::SocketAddr::new(ip, port);

    let mongodb_uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/taplist".into());
    let store = Store::connect(&mongodb_uri)
        .await
        .expect("Failed to connect to the document store!");

    let seed_dir = PathBuf::from(std::env::var("SEED_DATA_DIR").unwrap_or("data".into()));
    store
        .seed(&seed_dir)
        .await
        .expect("Failed to seed catalog data!");

    info!("Listening on {}", listen_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(web::resource("/register_user").route(web::post().to(users::register_user)))
            .service(web::resource("/user_exists").route(web::post().to(users::user_exists)))
            .service(web::resource("/drinks").route(web::get().to(catalog::get_drinks)))
            .service(
                web::resource("/drinks/categories").route(web::get().to(catalog::get_categories)),
            )
            .service(web::resource("/producers").route(web::get().to(catalog::get_producers)))
            .service(
                web::resource("/producers/{producer_id}")
                    .route(web::get().to(catalog::get_producer)),
            )
            .service(
                web::resource("/add_to_favorites")
                    .route(web::post().to(favorites::add_to_favorites)),
            )
            .service(
                web::resource("/remove_from_favorites")
                    .route(web::delete().to(favorites::remove_from_favorites)),
            )
            .service(web::resource("/get_favorites").route(web::get().to(favorites::get_favorites)))
            .service(
                web::resource("/recommendations").route(web::get().to(recommend::recommendations)),
            )
            .service(web::resource("/top_rated").route(web::get().to(ranking::top_rated)))
            .service(
                web::resource("/reviews")
                    .route(web::post().to(reviews::add_review))
                    .route(web::get().to(reviews::get_my_reviews)),
            )
            .service(
                web::resource("/reviews/drink/{drink_id}")
                    .route(web::get().to(reviews::get_drink_reviews)),
            )
            .service(
                web::resource("/reviews/producer/{producer_id}")
                    .route(web::get().to(reviews::get_producer_reviews)),
            )
            .service(
                web::resource("/reviews/{review_id}")
                    .route(web::delete().to(reviews::delete_review)),
            )
            .service(
                web::resource("/producer-reviews")
                    .route(web::post().to(reviews::add_producer_review))
                    .route(web::get().to(reviews::get_my_producer_reviews)),
            )
            .service(
                web::resource("/producer-reviews/{review_id}")
                    .route(web::delete().to(reviews::delete_producer_review)),
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(users::get_profile))
                    .route(web::put().to(users::update_profile)),
            )
            .service(web::resource("/last_login").route(web::post().to(users::set_last_login)))
    })
    .bind(listen_addr)?
    .run()
    .await
}
