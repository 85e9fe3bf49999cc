//! # twitstream CLI
//!
//! Command-line front end for the filtered-stream client: request a bearer
//! token, list/add/delete rules, and print the stream to stdout.
//!
//! Credentials come from flags or the `TWITTER_API_KEY`, `TWITTER_API_SECRET`
//! and `TWITTER_BEARER_TOKEN` environment variables. Set `RUST_LOG` to change
//! log verbosity.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twitstream::{
    ClientConfig, DeleteRulesRequest, RuleBuilder, RuleResponse, StreamError, StreamQuery,
    TokenGenerator, TwitterApi,
};

#[derive(Parser)]
#[command(name = "twitstream")]
#[command(about = "Manage filtered-stream rules and print the live stream")]
struct Cli {
    /// JSON client configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request an app-only bearer token
    Token {
        #[arg(long, env = "TWITTER_API_KEY", hide_env_values = true)]
        api_key: String,
        #[arg(long, env = "TWITTER_API_SECRET", hide_env_values = true)]
        api_secret: String,
    },
    /// Manage stream rules
    Rules {
        #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
        token: String,
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Print stream messages, one per line
    Stream {
        #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
        token: String,
        /// Expansion to request, repeatable
        #[arg(long = "expansion")]
        expansions: Vec<String>,
        /// Tweet field to request, repeatable
        #[arg(long = "tweet-field")]
        tweet_fields: Vec<String>,
        /// User field to request, repeatable
        #[arg(long = "user-field")]
        user_fields: Vec<String>,
        /// Minutes of missed messages to replay
        #[arg(long)]
        backfill_minutes: Option<u32>,
        /// Stop after this many messages
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List active rules
    List,
    /// Add one rule
    Add {
        value: String,
        tag: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete rules by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };

    match cli.command {
        Commands::Token {
            api_key,
            api_secret,
        } => {
            let token = TokenGenerator::with_config(api_key, api_secret, config)
                .request_bearer_token()
                .await?;
            println!("{}", token.access_token);
        }
        Commands::Rules { token, action } => {
            let api = TwitterApi::with_config(token, config)?;
            let response = match action {
                RulesAction::List => api.rules.get().await?,
                RulesAction::Add {
                    value,
                    tag,
                    dry_run,
                } => {
                    let request = RuleBuilder::new().add_rule(value, tag).build();
                    api.rules.create(&request, dry_run).await?
                }
                RulesAction::Delete { ids, dry_run } => {
                    api.rules
                        .delete(&DeleteRulesRequest::new(ids), dry_run)
                        .await?
                }
            };
            print_rules(&response);
        }
        Commands::Stream {
            token,
            expansions,
            tweet_fields,
            user_fields,
            backfill_minutes,
            limit,
        } => {
            let mut query = StreamQuery::new();
            for expansion in expansions {
                query = query.add_expansion(expansion);
            }
            for field in tweet_fields {
                query = query.add_tweet_field(field);
            }
            for field in user_fields {
                query = query.add_user_field(field);
            }
            if let Some(minutes) = backfill_minutes {
                query = query.backfill_minutes(minutes);
            }
            run_stream(TwitterApi::with_config(token, config)?, &query, limit).await?;
        }
    }

    Ok(())
}

async fn run_stream(
    mut api: TwitterApi,
    query: &StreamQuery,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let messages = api.stream.messages();
    api.stream.start(query).await.context("opening stream")?;

    let mut received = 0usize;
    let outcome = loop {
        if limit.is_some_and(|limit| received >= limit) {
            break Ok(());
        }

        let message = tokio::select! {
            message = messages.next() => message,
            _ = tokio::signal::ctrl_c() => break Ok(()),
        };

        match message.map(|m| m.into_result()) {
            None | Some(Err(StreamError::EndOfStream)) => break Ok(()),
            Some(Ok(bytes)) => {
                println!("{}", String::from_utf8_lossy(&bytes));
                received += 1;
            }
            Some(Err(e)) if e.is_terminal() => break Err(e),
            Some(Err(e)) => tracing::warn!("skipping message: {}", e),
        }
    };

    api.stream.stop();
    api.stream.join().await;
    tracing::info!(received, "stream closed");
    outcome.map_err(Into::into)
}

fn print_rules(response: &RuleResponse) {
    for rule in &response.data {
        println!("{}\t{}\t{}", rule.id, rule.tag, rule.value);
    }
    for error in &response.errors {
        eprintln!("rejected {:?}: {} ({})", error.value, error.title, error.kind);
    }
    let summary = &response.meta.summary;
    if summary.created + summary.not_created + summary.deleted + summary.not_deleted > 0 {
        eprintln!(
            "created {}, not created {}, deleted {}, not deleted {}",
            summary.created, summary.not_created, summary.deleted, summary.not_deleted
        );
    }
}
