use std::path::PathBuf;
use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgMatches, Command};
use crate::services::checkout::CheckoutSettings;

pub fn build_command() -> Command {
    Command::new("vocabd")
        .version("0.1")
        .about("Vocabulary flashcards: word service and terminal review")
        .subcommand_required(true)
        .arg(
            Arg::new("data")
                .long("data")
                .num_args(1)
                .global(true)
                .default_value("./share/words.yaml")
                .help("Word data set (.yaml, .yml or .json)"),
        )
        .arg(
            Arg::new("audio-dir")
                .long("audio-dir")
                .num_args(1)
                .global(true)
                .default_value("./share/audio")
                .help("Directory containing the word and sentence audio files"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .num_args(1)
                .global(true)
                .help("Specify a log file path (if omitted, logs to stderr)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .num_args(1)
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Seed for shuffling and cloud layout"),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve words, search, word cloud and checkout over HTTP")
                .arg(
                    Arg::new("listen-host")
                        .long("listen-host")
                        .num_args(1)
                        .default_value("0.0.0.0:2345")
                        .help("Specify the listen address (e.g., 0.0.0.0:2345)"),
                )
                .arg(
                    Arg::new("stripe-key")
                        .long("stripe-key")
                        .num_args(1)
                        .env("STRIPE_SECRET_KEY")
                        .hide_env_values(true)
                        .help("Payment provider secret key (checkout is disabled without it)"),
                )
                .arg(
                    Arg::new("success-url")
                        .long("success-url")
                        .num_args(1)
                        .help("Where the provider redirects after a completed payment"),
                )
                .arg(
                    Arg::new("cancel-url")
                        .long("cancel-url")
                        .num_args(1)
                        .help("Where the provider redirects after a cancelled payment"),
                ),
        )
        .subcommand(
            Command::new("review")
                .about("Review the deck in the terminal")
                .arg(
                    Arg::new("word")
                        .long("word")
                        .num_args(1)
                        .help("Open the deck on this word, as if picked in the word cloud"),
                ),
        )
}

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub listen_host: String,
    pub stripe_key: Option<String>,
    pub checkout: CheckoutSettings,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Serve(ServeConfig),
    Review { start_word: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data: PathBuf,
    pub audio_dir: PathBuf,
    pub log_file: Option<String>,
    pub seed: Option<u64>,
    pub mode: Mode,
}

fn path_arg(matches: &ArgMatches, name: &str) -> anyhow::Result<PathBuf> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .with_context(|| format!("{} argument must always have a default value", name))
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let mode = match matches.subcommand() {
            Some(("serve", sub)) => {
                let mut checkout = CheckoutSettings::default();
                if let Some(url) = sub.get_one::<String>("success-url") {
                    checkout.success_url = url.clone();
                }
                if let Some(url) = sub.get_one::<String>("cancel-url") {
                    checkout.cancel_url = url.clone();
                }
                Mode::Serve(ServeConfig {
                    listen_host: sub
                        .get_one::<String>("listen-host")
                        .cloned()
                        .context("listen-host argument must always have a default value")?,
                    stripe_key: sub.get_one::<String>("stripe-key").filter(|k| !k.is_empty()).cloned(),
                    checkout,
                })
            }
            Some(("review", sub)) => Mode::Review { start_word: sub.get_one::<String>("word").cloned() },
            Some((other, _)) => return Err(anyhow!("unknown subcommand '{}'", other)),
            None => return Err(anyhow!("a subcommand is required")),
        };

        Ok(Self {
            data: path_arg(matches, "data")?,
            audio_dir: path_arg(matches, "audio-dir")?,
            log_file: matches.get_one::<String>("log-file").cloned(),
            seed: matches.get_one::<u64>("seed").copied(),
            mode,
        })
    }
}
