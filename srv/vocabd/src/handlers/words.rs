use actix_web::{get, web, HttpResponse, Responder};
use crate::models::{AppState, SearchQuery, WordEntry, WordsQuery};
use crate::utils::{available_letters, parse_letter, search_words, words_by_letter};
use log::info;

#[get("/words")]
pub async fn list_words(
    data: web::Data<AppState>,
    query: web::Query<WordsQuery>,
) -> impl Responder {
    let Some(raw) = query.letter.as_deref() else {
        return HttpResponse::Ok().json(&data.words);
    };
    match parse_letter(raw) {
        Some(letter) => {
            let words = words_by_letter(&data.words, letter);
            info!("Loaded {} words for letter {}", words.len(), letter);
            HttpResponse::Ok().json(words)
        }
        None => HttpResponse::BadRequest().body(format!("'{}' is not a letter", raw)),
    }
}

#[get("/letters")]
pub async fn list_letters(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(available_letters(&data.words))
}

#[get("/search")]
pub async fn search(
    data: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let q = query.q.as_deref().unwrap_or("").trim();
    if q.is_empty() {
        return HttpResponse::BadRequest().json(Vec::<WordEntry>::new());
    }

    let matches = search_words(&data.words, q);
    info!("Search '{}' matched {} words", q, matches.len());
    HttpResponse::Ok().json(matches)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use actix_web::{test, App};
    use crate::services::checkout::{CheckoutSettings, DisabledCheckout};

    pub(crate) fn state(words: &[&str]) -> web::Data<AppState> {
        let words = words
            .iter()
            .enumerate()
            .map(|(i, w)| WordEntry {
                word: w.to_string(),
                rank: i as u32 + 1,
                freq: 100.0 / (i as f64 + 1.0),
                part_of_speech: None,
                word_audio_file: vec![format!("{}.mp3", w)],
                back_cards: vec![],
                sentence_audio_file: vec![],
            })
            .collect();
        web::Data::new(AppState {
            words,
            checkout: Box::new(DisabledCheckout),
            checkout_settings: CheckoutSettings::default(),
        })
    }

    #[actix_web::test]
    async fn test_list_words() {
        let app = test::init_service(App::new().app_data(state(&["the", "be"])).service(list_words)).await;
        let req = test::TestRequest::get().uri("/words").to_request();
        let body: Vec<WordEntry> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].word, "the");
    }

    #[actix_web::test]
    async fn test_words_by_letter() {
        let app = test::init_service(
            App::new().app_data(state(&["the", "be", "to", "Time"])).service(list_words),
        )
        .await;
        let req = test::TestRequest::get().uri("/words?letter=T").to_request();
        let body: Vec<WordEntry> = test::call_and_read_body_json(&app, req).await;
        let words: Vec<&str> = body.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["the", "to", "Time"]);

        let req = test::TestRequest::get().uri("/words?letter=x").to_request();
        let body: Vec<WordEntry> = test::call_and_read_body_json(&app, req).await;
        assert!(body.is_empty());

        let req = test::TestRequest::get().uri("/words?letter=th").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn test_list_letters() {
        let app = test::init_service(
            App::new().app_data(state(&["the", "be", "to", "and"])).service(list_letters),
        )
        .await;
        let req = test::TestRequest::get().uri("/letters").to_request();
        let body: Vec<char> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, vec!['a', 'b', 't']);
    }

    #[actix_web::test]
    async fn test_search_matches_substring() {
        let app = test::init_service(
            App::new().app_data(state(&["there", "the", "be", "other"])).service(search),
        )
        .await;
        let req = test::TestRequest::get().uri("/search?q=THE").to_request();
        let body: Vec<WordEntry> = test::call_and_read_body_json(&app, req).await;
        let words: Vec<&str> = body.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["there", "the", "other"]);
    }

    #[actix_web::test]
    async fn test_search_requires_query() {
        let app = test::init_service(App::new().app_data(state(&["the"])).service(search)).await;
        for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400, "{}", uri);
            let body = test::read_body(resp).await;
            assert_eq!(body, "[]");
        }
    }
}
