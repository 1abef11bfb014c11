// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `prefflags` binary: read and write flags in the configured stores.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prefflags::{FeatureProvider, MutableContext, PrefFlagsProvider, TracingEventSink};
use prefflags_config::{build_stores, initial_context, load_config, load_config_with_file};
use prefflags_store::SharedStore;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::FlagKind;

#[derive(Parser, Debug)]
#[command(
	name = "prefflags",
	about = "Read and write feature flags in local preference stores",
	version
)]
struct Args {
	/// Config file to use instead of `$XDG_CONFIG_HOME/prefflags/config.toml`
	#[arg(long, env = "PREFFLAGS_CONFIG")]
	config: Option<PathBuf>,

	/// Store namespace; defaults to the configured one, else the standard store
	#[arg(long, short)]
	namespace: Option<String>,

	/// Targeting key passed to the evaluation context
	#[arg(long, short = 't', default_value = "prefflags-cli")]
	targeting_key: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Evaluate a flag and print its resolution details
	Get {
		key: String,
		#[arg(long, value_enum, default_value_t = FlagKind::Object)]
		kind: FlagKind,
		/// Default value, parsed as the requested kind
		#[arg(long)]
		default: Option<String>,
	},
	/// Store a flag value
	Set {
		key: String,
		value: String,
		#[arg(long, value_enum, default_value_t = FlagKind::Object)]
		kind: FlagKind,
	},
	/// Remove a stored flag value
	Remove { key: String },
	/// Print every visible flag
	List,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => load_config_with_file(path),
		None => load_config(),
	}
	.context("failed to load configuration")?;

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	config.log_summary();

	let stores = build_stores(&config).context("failed to open stores")?;
	let provider = PrefFlagsProvider::new(stores.clone(), Arc::new(TracingEventSink));
	provider.initialize(initial_context(&config.store))?;

	let namespace = args.namespace.or(config.store.namespace);
	let mut context = MutableContext::new().with_targeting_key(args.targeting_key);
	if let Some(namespace) = &namespace {
		context = context.with_namespace(namespace.clone());
	}
	debug!(
		namespace = namespace.as_deref().unwrap_or("standard"),
		command = ?args.command,
		"running command"
	);

	let open_store = || -> Result<SharedStore> {
		match &namespace {
			Some(namespace) => stores
				.open_named(namespace)
				.with_context(|| format!("cannot open store with namespace '{namespace}'")),
			None => Ok(stores.standard()),
		}
	};

	let mut out = std::io::stdout().lock();
	match args.command {
		Command::Get { key, kind, default } => {
			commands::get(&provider, &key, kind, default.as_deref(), &context, &mut out)
		}
		Command::Set { key, value, kind } => commands::set(&provider, &key, kind, &value, &context),
		Command::Remove { key } => commands::remove(open_store()?.as_ref(), &key),
		Command::List => commands::list(open_store()?.as_ref(), &mut out),
	}
}
