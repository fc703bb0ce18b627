//! Helpdesk management commands
//!
//! ```bash
//! manage runserver --addr 127.0.0.1:4000
//! manage check
//! manage purge --yes
//! manage hash-password 's3cret!'
//! ```

use std::net::SocketAddr;
use std::process;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use helpdesk::config::app::{build_server, build_state, open_store};
use helpdesk_auth::{Argon2Hasher, PasswordHasher};
use helpdesk_conf::{LogFormat, Settings};
use helpdesk_server::ShutdownCoordinator;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "Helpdesk management utility", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Serve the API until Ctrl-C or SIGTERM
	Runserver {
		/// Address to bind, overriding HOST and PORT
		#[arg(long, value_name = "HOST:PORT")]
		addr: Option<SocketAddr>,
	},

	/// Delete every ticket in the configured store
	Purge {
		/// Confirm the deletion
		#[arg(long)]
		yes: bool,
	},

	/// Validate configuration and exit
	Check,

	/// Print an Argon2 hash for seeding a credential store
	HashPassword {
		#[arg(value_name = "PASSWORD")]
		password: String,
	},
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();

	let result = match cli.command {
		Commands::Runserver { addr } => run_server(addr).await,
		Commands::Purge { yes } => run_purge(yes).await,
		Commands::Check => run_check(),
		Commands::HashPassword { password } => run_hash_password(&password),
	};

	if let Err(e) = result {
		eprintln!("Error: {:#}", e);
		process::exit(1);
	}
}

fn init_tracing(settings: &Settings) {
	let env_filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

	match settings.log_format {
		LogFormat::Json => tracing_subscriber::registry()
			.with(env_filter)
			.with(fmt::layer().json().flatten_event(true).with_current_span(false))
			.init(),
		LogFormat::Text => tracing_subscriber::registry().with(env_filter).with(fmt::layer()).init(),
	}
}

async fn run_server(addr: Option<SocketAddr>) -> anyhow::Result<()> {
	let settings = Settings::load()?;
	init_tracing(&settings);

	let addr = addr.unwrap_or_else(|| settings.bind_addr());
	let state = build_state(&settings).await?;
	let server = build_server(state, &settings);

	let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout);
	tokio::spawn({
		let coordinator = coordinator.clone();
		async move { coordinator.wait_for_signal().await }
	});

	server
		.listen_with_shutdown(addr, coordinator)
		.await
		.context("server failed")
}

async fn run_purge(yes: bool) -> anyhow::Result<()> {
	if !yes {
		bail!("refusing to delete all tickets without --yes");
	}

	let settings = Settings::load()?;
	init_tracing(&settings);

	let store = open_store(&settings.database).await?;
	let removed = store.purge().await?;
	println!("Deleted {} ticket(s).", removed);
	Ok(())
}

fn run_check() -> anyhow::Result<()> {
	let settings = Settings::load()?;
	println!(
		"Configuration OK: listening on {}, database {:?}, log format {}",
		settings.bind_addr(),
		settings.database,
		settings.log_format
	);
	Ok(())
}

fn run_hash_password(password: &str) -> anyhow::Result<()> {
	let hash = Argon2Hasher::new().hash(password)?;
	println!("{}", hash);
	Ok(())
}
