use actix_web::{web, App, HttpServer};
use std::fs::OpenOptions;
use std::io::Write;
use anyhow::Context;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocabd::config::{build_command, Config, Mode, ServeConfig};
use vocabd::engine::cloud::{layout, ApproxMetrics, Canvas};
use vocabd::engine::{FileAudioLoader, LogSink, Session, SessionOptions, WordStore, CACHE_CAPACITY};
use vocabd::handlers::{checkout, cloud, words};
use vocabd::models::AppState;
use vocabd::services::checkout::{CheckoutProvider, DisabledCheckout, StripeCheckout};
use vocabd::services::word_loader::load_words_or_warn;

fn init_logging(log_file: Option<&String>) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} [{}] {}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(file) = log_file {
        let log_output = OpenOptions::new().create(true).append(true).open(file)?;
        builder.target(env_logger::Target::Pipe(Box::new(log_output)));
    }
    builder.init();
    Ok(())
}

async fn serve(config: &Config, settings: &ServeConfig) -> anyhow::Result<()> {
    let entries = load_words_or_warn(&config.data);

    let provider: Box<dyn CheckoutProvider> = match &settings.stripe_key {
        Some(key) => Box::new(StripeCheckout::new(key.clone())),
        None => {
            warn!("No payment provider key given; checkout is disabled.");
            Box::new(DisabledCheckout)
        }
    };

    let shared_state = web::Data::new(AppState {
        words: entries,
        checkout: provider,
        checkout_settings: settings.checkout.clone(),
    });

    info!("Listening on {}", settings.listen_host);
    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .service(words::list_words)
            .service(words::list_letters)
            .service(words::search)
            .service(cloud::cloud)
            .service(checkout::create_checkout_session)
    })
    .bind(&settings.listen_host)
    .with_context(|| format!("could not bind {}", settings.listen_host))?
    .run()
    .await?;
    Ok(())
}

async fn review(config: &Config, start_word: Option<&str>) -> anyhow::Result<()> {
    let store = WordStore::new(load_words_or_warn(&config.data));
    let loader = FileAudioLoader::new(&config.audio_dir);
    let options = SessionOptions { cache_capacity: CACHE_CAPACITY, seed: config.seed };

    let selection = start_word.and_then(|word| {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let canvas = Canvas { width: 1024.0, viewport_height: 768.0 };
        let word_cloud = layout(store.words(), canvas, &ApproxMetrics::default(), &mut rng);
        let selected = word_cloud.select(word, store.words());
        if selected.is_none() {
            warn!("'{}' is not in the word cloud; starting at the first card.", word);
        }
        selected
    });

    let session = match selection {
        Some(selected) => Session::from_selection(store, &selected, LogSink, loader, options),
        None => Session::new(store, LogSink, loader, options),
    };
    session.run_terminal().await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_command().get_matches();
    let config = Config::from_matches(&matches)?;

    init_logging(config.log_file.as_ref()).context("Failed to open log file")?;

    match &config.mode {
        Mode::Serve(serve_config) => serve(&config, serve_config).await,
        Mode::Review { start_word } => review(&config, start_word.as_deref()).await,
    }
}
