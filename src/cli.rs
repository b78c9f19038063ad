use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use concertq::clients::{
    TokenCache, build_http_client,
    errors::{Error, Result},
    token,
};
use concertq::config::{ConfigBuilder, USER_AGENT};
use concertq::query::QueryTool;
use concertq::{relay, render};
use log::info;
use rspotify::Credentials;

#[derive(Parser)]
#[command(name = "concertq")]
#[command(version, about = "Look up an artist or track on Spotify, MusicBrainz, the Internet Archive and lyrics.ovh", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the token relay
    Serve {
        #[arg(long, env = "CONCERTQ_BIND", default_value = "127.0.0.1:3000")]
        bind: String,
        #[arg(long, env = "SPOTIFY_CLIENT_ID")]
        client_id: String,
        #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,
        #[arg(long, default_value = relay::DEFAULT_TOKEN_URL)]
        token_url: String,
    },
    /// Load a Spotify token and cache it for later searches
    Token {
        #[arg(long = "relay", env = "CONCERTQ_RELAY_URL", default_value = "http://127.0.0.1:3000")]
        relay_url: String,
        /// Skip the relay and use local client credentials
        #[arg(long)]
        direct: bool,
        #[arg(long, env = "SPOTIFY_CLIENT_ID")]
        client_id: Option<String>,
        #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,
    },
    /// Search by artist or track
    Search {
        query: String,
        #[arg(long, value_enum, default_value_t = Mode::Artist)]
        mode: Mode,
        #[arg(long, value_enum, default_value_t = Format::List)]
        format: Format,
        /// Use this token instead of the cached one
        #[arg(long, env = "SPOTIFY_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Tracks per result, 1 to 50
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=50))]
        limit: u8,
        #[arg(long, default_value = "US")]
        market: String,
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
        /// Sent to every upstream; MusicBrainz wants a contact address in it
        #[arg(long, env = "CONCERTQ_USER_AGENT", default_value = USER_AGENT)]
        user_agent: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Artist,
    Track,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    List,
    Table,
    Json,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            client_id,
            client_secret,
            token_url,
        } => {
            let http = build_http_client(USER_AGENT, Duration::from_secs(30))?;
            let state = relay::RelayState::new(
                http,
                Credentials::new(&client_id, &client_secret),
                &token_url,
            );
            relay::serve(&bind, state).await
        }
        Commands::Token {
            relay_url,
            direct,
            client_id,
            client_secret,
        } => load_token(&relay_url, direct, client_id, client_secret).await,
        Commands::Search {
            query,
            mode,
            format,
            token,
            limit,
            market,
            timeout,
            user_agent,
        } => {
            let token = match token {
                Some(token) => token,
                None => TokenCache::default().access_token().await?,
            };
            let config = ConfigBuilder::new()
                .token(token)
                .limit(limit.into())
                .market(market)
                .timeout(Duration::from_secs(timeout))
                .user_agent(user_agent)
                .build()?;
            search(QueryTool::new(config), &query, mode, format).await
        }
    }
}

async fn load_token(
    relay_url: &str,
    direct: bool,
    client_id: Option<String>,
    client_secret: Option<String>,
) -> Result<()> {
    let loaded = if direct {
        let (Some(id), Some(secret)) = (client_id, client_secret) else {
            return Err(Error::ConfigurationError(
                "Missing Spotify credentials. Set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET.".into(),
            ));
        };
        token::request_direct(Credentials::new(&id, &secret)).await?
    } else {
        let http = build_http_client(USER_AGENT, Duration::from_secs(30))?;
        token::fetch_from_relay(&http, relay_url).await?
    };

    TokenCache::default().store(&loaded).await?;
    info!("Token loaded, valid until {}", loaded.expires_at);
    println!("Token Loaded ✔️");
    Ok(())
}

async fn search(tool: QueryTool, query: &str, mode: Mode, format: Format) -> Result<()> {
    let output = match mode {
        Mode::Artist => {
            let card = tool.search_artist(query).await?;
            match format {
                Format::List => render::render_card(&card),
                Format::Table => render::render_card_table(&card),
                Format::Json => serde_json::to_string_pretty(&card)?,
            }
        }
        Mode::Track => {
            let tracks = tool.search_tracks(query).await?;
            match format {
                Format::List => render::render_tracks(&tracks),
                Format::Table => render::render_tracks_table(&tracks),
                Format::Json => serde_json::to_string_pretty(&tracks)?,
            }
        }
    };
    println!("{output}");
    Ok(())
}
