//! authgate - login and bearer-token gate service
//!
//! Serves the auth API and offers a few helpers for working with tokens and
//! password hashes from the command line.

use anyhow::{Context, Result};
use authgate_api::{ApiServer, ApiServerConfig};
use authgate_auth::{
    Argon2Scheme, InMemoryUserStore, JwtSigner, JwtValidator, NewIdentity, PasswordScheme,
    TokenSigner, TokenVerifier, UserStore, DEFAULT_TOKEN_VALIDITY_SECS,
};
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Upper bound accepted for token lifetimes (one year)
const MAX_TOKEN_VALIDITY_SECS: i64 = 365 * 24 * 60 * 60;

/// authgate - token based login and request gating
#[derive(Parser, Debug)]
#[command(name = "authgate")]
#[command(about = "Token based login and request gating service")]
#[command(version = env!("GIT_TAG"))]
#[command(long_version = concat!(env!("GIT_TAG"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the auth API server with an in-memory user store
    #[command(long_about = r#"
Run the auth API server. Users live in memory and are lost on restart;
use --seed-user to create accounts at startup.

EXAMPLES:
  authgate serve --jwt-secret "$SECRET" --seed-user test@test.com:tester

ENVIRONMENT VARIABLES:
  AUTHGATE_BIND            Address to listen on
  AUTHGATE_JWT_SECRET      Secret used to sign access tokens
  AUTHGATE_TOKEN_TTL_SECS  Access token lifetime in seconds
    "#)]
    Serve {
        /// Address to listen on
        #[arg(long, env = "AUTHGATE_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Secret used to sign and verify access tokens
        #[arg(long, env = "AUTHGATE_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        /// Access token lifetime in seconds
        #[arg(
            long,
            env = "AUTHGATE_TOKEN_TTL_SECS",
            default_value_t = DEFAULT_TOKEN_VALIDITY_SECS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_VALIDITY_SECS)
        )]
        token_ttl_secs: i64,

        /// Allow browser requests from localhost origins
        #[arg(long)]
        enable_cors: bool,

        /// Account to create at startup, as email:password (repeatable)
        #[arg(long = "seed-user", value_name = "EMAIL:PASSWORD")]
        seed_users: Vec<String>,
    },

    /// Hash a password with Argon2id
    HashPassword {
        password: String,
    },

    /// Issue an access token without logging in
    IssueToken {
        /// Secret used to sign the token (must match the server's)
        #[arg(long, env = "AUTHGATE_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        #[arg(long)]
        user_id: String,

        #[arg(long)]
        email: String,

        /// Token validity in hours
        #[arg(
            long,
            default_value = "1",
            value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_VALIDITY_SECS / 3600)
        )]
        hours: i64,
    },

    /// Verify an access token and print its claims
    VerifyToken {
        /// Secret the token was signed with
        #[arg(long, env = "AUTHGATE_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        token: String,
    },
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Create the `--seed-user` accounts in the store
async fn seed_users(
    store: &dyn UserStore,
    passwords: &dyn PasswordScheme,
    seeds: &[String],
) -> Result<()> {
    for seed in seeds {
        let (email, password) = seed
            .split_once(':')
            .with_context(|| format!("Invalid --seed-user '{}', expected email:password", seed))?;
        let email = email.trim().to_lowercase();

        let password_hash = passwords
            .hash(password)
            .context("Failed to hash seed user password")?;
        let identity = store
            .create(NewIdentity {
                name: email.clone(),
                email,
                password_hash,
            })
            .await
            .context("Failed to create seed user")?;

        info!(user_id = %identity.id, "Seeded user {}", identity.email);
    }

    Ok(())
}

async fn serve(config: ApiServerConfig, seeds: &[String]) -> Result<()> {
    let store = Arc::new(InMemoryUserStore::new());
    let passwords = Arc::new(Argon2Scheme::new().context("Failed to initialise Argon2")?);

    seed_users(store.as_ref(), passwords.as_ref(), seeds).await?;

    let server = ApiServer::new(config, store, passwords)?;

    tokio::select! {
        result = server.start() => {
            if let Err(e) = &result {
                error!("API server error: {:#}", e);
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Serve {
            bind,
            jwt_secret,
            token_ttl_secs,
            enable_cors,
            seed_users,
        } => {
            if jwt_secret.is_empty() {
                anyhow::bail!("--jwt-secret must not be empty");
            }

            let mut config = ApiServerConfig::new(jwt_secret);
            config.bind_addr = bind;
            config.enable_cors = enable_cors;
            config.token_validity = TimeDelta::try_seconds(token_ttl_secs)
                .context("--token-ttl-secs is out of range")?;

            info!("authgate starting...");
            serve(config, &seed_users).await
        }
        Commands::HashPassword { password } => {
            let hash = authgate_auth::hash_password(&password).context("Failed to hash password")?;
            println!("{}", hash);
            Ok(())
        }
        Commands::IssueToken {
            jwt_secret,
            user_id,
            email,
            hours,
        } => {
            let validity = TimeDelta::try_hours(hours).context("--hours is out of range")?;
            let token = JwtSigner::new(jwt_secret.as_bytes())
                .with_validity(validity)
                .sign(&email, &user_id)
                .context("Failed to sign token")?;

            println!("{}", token);
            Ok(())
        }
        Commands::VerifyToken { jwt_secret, token } => {
            let claims = JwtValidator::new(jwt_secret.as_bytes())
                .verify(&token)
                .context("Token rejected")?;

            println!("User ID: {}", claims.user_id);
            println!("Email:   {}", claims.email);
            println!("Expires: {}", claims.expires_at().to_rfc3339());
            Ok(())
        }
    }
}
