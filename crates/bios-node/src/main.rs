//! bios: the launch coordinator binary.
//!
//! Every operator of a new network runs this against their own clean-slate
//! node, with their local `bios.json` and the shared `launch.json`. The
//! schedule decides who boots the chain; everybody else verifies and joins.
//!
//! Usage:
//!   bios run              [--seed-root <hex> --seed-time <rfc3339>] [--kickstart-file <path>] [--dry-run]
//!   bios schedule         [--seed-root <hex> --seed-time <rfc3339>]
//!   bios keygen           [--out <path>]
//!   bios decode-kickstart [--file <path>]
//!
//! `--config` (default `bios.json`) and `--launch` (default `launch.json`)
//! apply to every command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use bios_boot::{
    load_launch_data, load_snapshot, print_role_summary, Config, KickstartSource, LaunchContext,
    Orchestrator, StdinKickstartSource, TextKickstartSource,
};
use bios_chain::{ChainClient, JsonRpcChainClient, MemoryChain};
use bios_core::constants::SYSTEM_ACCOUNT;
use bios_core::{AccountInfo, Authority, Permission};
use bios_crypto::KeyPair;
use bios_genesis::decode_kickstart;
use bios_hooks::{ConfiguredHooks, HookDispatcher, MemoryHooks};
use bios_schedule::{Role, ShuffleSeed};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "bios",
    version,
    about = "BIOS launch coordinator: boot a brand-new network from a shared launch file"
)]
struct Args {
    /// Local operator config (JSON).
    #[arg(long, global = true, default_value = "bios.json")]
    config: PathBuf,

    /// Launch data shared by all operators (JSON).
    #[arg(long, global = true, default_value = "launch.json")]
    launch: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SeedOpts {
    /// Shuffle seed root (hex). Required unless `debug.no_shuffle` is set.
    #[arg(long)]
    seed_root: Option<String>,

    /// Shuffle seed time (RFC 3339). Becomes the genesis timestamp.
    /// Required unless `debug.no_shuffle` is set, which defaults it to now.
    #[arg(long)]
    seed_time: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the launch for the local producer.
    Run {
        #[command(flatten)]
        seed: SeedOpts,

        /// Read kickstart data from this file instead of stdin.
        #[arg(long)]
        kickstart_file: Option<PathBuf>,

        /// Use an in-memory chain and record hooks instead of delivering them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the launch schedule and the local role, without touching the chain.
    Schedule {
        #[command(flatten)]
        seed: SeedOpts,
    },

    /// Generate a Dilithium2 keypair for block signing.
    Keygen {
        /// Write the private key here instead of printing it.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Decode pasted kickstart data and print it.
    DecodeKickstart {
        /// Read the kickstart data from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bios=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    match &args.command {
        Command::Run {
            seed,
            kickstart_file,
            dry_run,
        } => cmd_run(&args, seed, kickstart_file.as_deref(), *dry_run).await,
        Command::Schedule { seed } => cmd_schedule(&args, seed),
        Command::Keygen { out } => cmd_keygen(out.as_deref()),
        Command::DecodeKickstart { file } => cmd_decode_kickstart(file.as_deref()).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

async fn cmd_run(
    args: &Args,
    seed: &SeedOpts,
    kickstart_file: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let ctx = load_context(args, seed)?;

    let input: Box<dyn KickstartSource> = match kickstart_file {
        Some(path) => {
            let path = expand_tilde(path);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading kickstart data {}", path.display()))?;
            Box::new(TextKickstartSource::new(text))
        }
        None => Box::new(StdinKickstartSource::new()),
    };

    if dry_run {
        info!("dry run: in-memory chain, hooks recorded only");
        let system_key = KeyPair::generate();
        let chain = MemoryChain::new(vec![0; 32], &system_key.public_key);
        if ctx.role() == Role::AppointedProducer {
            // Nobody will lock the in-memory system account for us.
            chain.handle().set_account(disabled_system_account());
        }
        let hooks = MemoryHooks::new();
        execute(ctx, chain, hooks.clone(), input).await?;
        info!(hooks = ?hooks.keys(), "dry run finished");
        return Ok(());
    }

    let hooks = ConfiguredHooks::new(ctx.config.hooks.clone());
    hooks.log_summary();
    let chain = JsonRpcChainClient::new(&ctx.config.producer.api_address);
    execute(ctx, chain, hooks, input).await
}

async fn execute<C, H>(
    ctx: LaunchContext,
    chain: C,
    hooks: H,
    input: Box<dyn KickstartSource>,
) -> anyhow::Result<()>
where
    C: ChainClient,
    H: HookDispatcher,
{
    let mut orchestrator = Orchestrator::new(ctx, chain, hooks, input);
    let report = orchestrator.run().await.context("launch aborted")?;
    info!(
        role = %report.role,
        regproducer_tx = %report.regproducer_tx,
        bios_p2p_address = %report.kickstart.bios_p2p_address,
        "launch complete"
    );
    Ok(())
}

fn cmd_schedule(args: &Args, seed: &SeedOpts) -> anyhow::Result<()> {
    let ctx = load_context(args, seed)?;
    let role = ctx.role();
    print_role_summary(&ctx, role);

    let mine = ctx.my_producer_defs()?;
    println!("Local account {} answers for:", ctx.local_account());
    for def in &mine {
        println!("  {def}");
    }
    Ok(())
}

fn cmd_keygen(out: Option<&Path>) -> anyhow::Result<()> {
    let kp = KeyPair::generate();
    match out {
        Some(path) => {
            let path = expand_tilde(path);
            if path.exists() {
                bail!("{} already exists; refusing to overwrite", path.display());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&path, format!("{}\n", kp.private_key.to_text()))
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "private key written");
            println!("Public key: {}", kp.public_key);
            println!("Private key written to {}", path.display());
        }
        None => {
            println!("Public key:  {}", kp.public_key);
            println!("Private key: {}", kp.private_key.to_text());
        }
    }
    Ok(())
}

async fn cmd_decode_kickstart(file: Option<&Path>) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => {
            let path = expand_tilde(path);
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?
        }
        None => StdinKickstartSource::new().read_block().await?,
    };

    let payload = decode_kickstart(&text)?;
    let genesis = payload.genesis()?;

    println!("BIOS p2p address: {}", payload.bios_p2p_address);
    println!("Public key used:  {}", payload.public_key_used);
    println!("Genesis:");
    println!(
        "{}",
        serde_json::to_string_pretty(&genesis).context("formatting genesis")?
    );
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn load_context(args: &Args, seed: &SeedOpts) -> anyhow::Result<LaunchContext> {
    let config_path = expand_tilde(&args.config);
    let config = Config::load(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let launch = load_launch_data(&expand_tilde(&args.launch))?;
    let snapshot = load_snapshot(&config)?;
    let seed = parse_seed(seed, config.debug.no_shuffle)?;
    info!(
        time = %seed.time,
        root = %hex::encode(&seed.root),
        candidates = launch.producers.len(),
        "building schedule"
    );
    Ok(LaunchContext::new(config, launch, snapshot, &seed)?)
}

fn parse_seed(opts: &SeedOpts, no_shuffle: bool) -> anyhow::Result<ShuffleSeed> {
    let time = match &opts.seed_time {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("parsing --seed-time {s:?}"))?
            .with_timezone(&Utc),
        None if no_shuffle => Utc::now(),
        None => bail!("--seed-time is required unless debug.no_shuffle is set"),
    };
    // Genesis carries whole seconds only.
    let time = DateTime::from_timestamp(time.timestamp(), 0).context("seed time out of range")?;

    let root = match &opts.seed_root {
        Some(s) => hex::decode(s).with_context(|| format!("parsing --seed-root {s:?}"))?,
        None if no_shuffle => Vec::new(),
        None => bail!("--seed-root is required unless debug.no_shuffle is set"),
    };
    Ok(ShuffleSeed::new(time, root))
}

fn disabled_system_account() -> AccountInfo {
    let perm = |name: &str, parent: &str| Permission {
        perm_name: name.into(),
        parent: parent.into(),
        required_auth: Authority::disabled(),
    };
    AccountInfo {
        account_name: SYSTEM_ACCOUNT.into(),
        permissions: vec![perm("owner", ""), perm("active", "owner")],
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok();
    expand_tilde_with(path, home.as_deref())
}

fn expand_tilde_with(path: &Path, home: Option<&str>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(stripped), Some(home)) => PathBuf::from(home).join(stripped),
        _ => path.to_path_buf(),
    }
}
