use actix_web::{get, web, HttpResponse, Responder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::engine::cloud::{layout, ApproxMetrics, Canvas};
use crate::models::{AppState, CloudQuery};
use log::info;

const DEFAULT_WIDTH: f64 = 1024.0;
const DEFAULT_HEIGHT: f64 = 768.0;

#[get("/cloud")]
pub async fn cloud(
    data: web::Data<AppState>,
    query: web::Query<CloudQuery>,
) -> impl Responder {
    let width = query.width.unwrap_or(DEFAULT_WIDTH);
    let height = query.height.unwrap_or(DEFAULT_HEIGHT);
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return HttpResponse::BadRequest().body("width and height must be positive");
    }

    let mut rng = match query.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let canvas = Canvas { width, viewport_height: height };
    let cloud = layout(&data.words, canvas, &ApproxMetrics::default(), &mut rng);

    info!("Generated cloud {}x{} with {} words", width, cloud.height, cloud.words.len());
    HttpResponse::Ok().json(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::Value;
    use crate::handlers::words::tests::state;

    #[actix_web::test]
    async fn test_cloud_is_deterministic_with_seed() {
        let app = test::init_service(
            App::new().app_data(state(&["the", "be", "to", "of", "and"])).service(cloud),
        )
        .await;
        let uri = "/cloud?width=800&height=600&seed=7";
        let first: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let second: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(first, second);
        assert_eq!(first["words"].as_array().map(|w| w.len()), Some(5));
        assert_eq!(first["width"], 800.0);
    }

    #[actix_web::test]
    async fn test_cloud_rejects_bad_canvas() {
        let app = test::init_service(App::new().app_data(state(&["the"])).service(cloud)).await;
        let req = test::TestRequest::get().uri("/cloud?width=0").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
