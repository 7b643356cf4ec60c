//! DocGuard daemon: HTTP server and command-line client for a local ledger.

mod keyfile;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser};

use docguard_access::{
    authorization_message, AccessAction, AccessPolicy, ReadAuthorization, LISTING_SCOPE,
};
use docguard_crypto::{fingerprint_file, IdentityProvider};
use docguard_node::{
    init_logging, DocGuardNode, NodeConfig, ShutdownController, SignedAccessChange,
    SignedSuppression,
};
use docguard_rpc::RpcServer;
use docguard_types::{Fingerprint, GeoPoint, LocationConstraint, SubmitterAddress, Timestamp};
use docguard_utils::{format_age, format_coordinates, format_distance, format_duration};
use docguard_verification::{LocationFix, VerificationOutcome, VerificationVerdict};

#[derive(Parser)]
#[command(
    name = "docguard",
    version,
    about = "Document provenance and location-gated verification"
)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the LMDB ledger.
    #[arg(long, global = true, env = "DOCGUARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "DOCGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "DOCGUARD_LOG_FORMAT")]
    log_format: Option<String>,

    /// Read policy: "submitter_only" or "public_read".
    #[arg(long, global = true, env = "DOCGUARD_ACCESS_POLICY", value_parser = parse_policy)]
    access_policy: Option<AccessPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP server until SIGINT or SIGTERM.
    Serve {
        #[arg(long, env = "DOCGUARD_RPC_BIND")]
        bind: Option<String>,
        #[arg(long, env = "DOCGUARD_RPC_PORT")]
        port: Option<u16>,
        /// Expose Prometheus metrics at /metrics.
        #[arg(long, env = "DOCGUARD_ENABLE_METRICS")]
        metrics: bool,
    },
    /// Create a new signing key.
    Keygen {
        #[arg(long, short)]
        out: PathBuf,
    },
    /// Print the address of a key.
    Address {
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: PathBuf,
    },
    /// Print the fingerprint of a file.
    Fingerprint { file: PathBuf },
    /// Print the submission signature for a file.
    Sign {
        file: PathBuf,
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: PathBuf,
    },
    /// Store a file and bind its fingerprint to the key's address.
    Submit {
        file: PathBuf,
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: PathBuf,
        #[command(flatten)]
        geofence: GeofenceArgs,
    },
    /// Check a file against the ledger.
    ///
    /// Exit status: 0 verified, 1 not found or tampered, 2 outside the
    /// geofence, 3 location could not be determined.
    Verify {
        file: PathBuf,
        /// Sign the read with this key.
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: Option<PathBuf>,
        /// Current latitude. Without --lat/--lon no position is sent.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Show the record for a fingerprint.
    Record {
        fingerprint: String,
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: Option<PathBuf>,
    },
    /// List records in submission order.
    Audit {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// List as this key's address; required to see anything under
        /// submitter_only.
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: Option<PathBuf>,
    },
    /// Allow another address to read and verify a record.
    Grant {
        fingerprint: String,
        grantee: String,
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: PathBuf,
    },
    /// Withdraw a grant.
    Revoke {
        fingerprint: String,
        grantee: String,
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: PathBuf,
    },
    /// Check whether an address may read a record.
    Check {
        fingerprint: String,
        address: String,
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: Option<PathBuf>,
    },
    /// Hide a record from the audit listing (or show it again with --undo).
    Hide {
        fingerprint: String,
        #[arg(long, short, env = "DOCGUARD_KEY")]
        key: PathBuf,
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Args)]
struct GeofenceArgs {
    /// Reference latitude for a location-gated record.
    #[arg(long, requires_all = ["lon", "radius"], allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires_all = ["lat", "radius"], allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Geofence radius in metres.
    #[arg(long, requires_all = ["lat", "lon"])]
    radius: Option<f64>,
}

impl GeofenceArgs {
    fn constraint(&self) -> anyhow::Result<Option<LocationConstraint>> {
        match (self.lat, self.lon, self.radius) {
            (Some(lat), Some(lon), Some(radius)) => {
                let reference = GeoPoint::new(lat, lon)?;
                Ok(Some(LocationConstraint::new(reference, radius)?))
            }
            _ => Ok(None),
        }
    }
}

fn parse_policy(s: &str) -> Result<AccessPolicy, String> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "submitter_only" => Ok(AccessPolicy::SubmitterOnly),
        "public_read" | "public" => Ok(AccessPolicy::PublicRead),
        other => Err(format!("unknown access policy \"{other}\"")),
    }
}

/// File config first, then flags and env vars on top.
fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(policy) = cli.access_policy {
        config.access.policy = policy;
    }
    if let Command::Serve {
        bind,
        port,
        metrics,
    } = &cli.command
    {
        if let Some(bind) = bind {
            config.rpc_bind = bind.clone();
        }
        if let Some(port) = port {
            config.rpc_port = *port;
        }
        config.enable_metrics |= *metrics;
    }
    config.validate()?;
    Ok(config)
}

fn parse_fingerprint(s: &str) -> anyhow::Result<Fingerprint> {
    Fingerprint::from_hex(s).with_context(|| format!("invalid fingerprint \"{s}\""))
}

fn parse_address(s: &str) -> anyhow::Result<SubmitterAddress> {
    SubmitterAddress::parse(s).with_context(|| format!("invalid address \"{s}\""))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_node(config: NodeConfig) -> anyhow::Result<DocGuardNode> {
    let data_dir = config.data_dir.clone();
    DocGuardNode::open(config).with_context(|| format!("opening ledger at {}", data_dir.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::Serve { .. } => {
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Keygen { out } => {
            let identity = keyfile::create(&out)?;
            eprintln!("wrote key to {}", out.display());
            println!("{}", identity.address());
            Ok(ExitCode::SUCCESS)
        }
        Command::Address { key } => {
            println!("{}", keyfile::load(&key)?.address());
            Ok(ExitCode::SUCCESS)
        }
        Command::Fingerprint { file } => {
            println!("{}", file_fingerprint(&file)?.to_hex());
            Ok(ExitCode::SUCCESS)
        }
        Command::Sign { file, key } => {
            let identity = keyfile::load(&key)?;
            let fp = file_fingerprint(&file)?;
            let signature = identity.sign_fingerprint(&fp, identity.address())?;
            println!("{}", signature.to_hex());
            Ok(ExitCode::SUCCESS)
        }
        Command::Submit {
            file,
            key,
            geofence,
        } => {
            let identity = keyfile::load(&key)?;
            let location = geofence.constraint()?;
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let fp = docguard_crypto::fingerprint(&bytes);
            let signature = identity.sign_fingerprint(&fp, identity.address())?;

            let node = open_node(config)?;
            let outcome = node.submit(&bytes, identity.address().clone(), signature, location)?;
            print_json(&serde_json::json!({
                "outcome": if outcome.is_bound() { "bound" } else { "conflict" },
                "ownPriorSubmission": outcome.is_own_prior_submission(identity.address()),
                "record": outcome.record(),
            }))?;
            Ok(if outcome.is_bound() || outcome.is_own_prior_submission(identity.address()) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Verify {
            file,
            key,
            lat,
            lon,
        } => {
            let node = open_node(config)?;
            let verdict = verify_file(&node, &file, key.as_deref(), lat, lon)?;
            print_json(&verdict.to_envelope())?;
            match verdict.distance_meters {
                Some(d) => eprintln!(
                    "{} ({} from reference)",
                    verdict.outcome.as_str(),
                    format_distance(d)
                ),
                None => eprintln!("{}", verdict.outcome.as_str()),
            }
            Ok(ExitCode::from(verdict_exit_status(verdict.outcome)))
        }
        Command::Record { fingerprint, key } => {
            let fp = parse_fingerprint(&fingerprint)?;
            let reader = signed_read(key.as_deref(), &fp)?;
            let node = open_node(config)?;
            match node.record(&fp, reader.as_ref())? {
                Some(record) => {
                    print_json(&record)?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("no record for {}", fp.to_hex());
                    Ok(ExitCode::from(1))
                }
            }
        }
        Command::Audit { offset, count, key } => {
            let reader = signed_read(key.as_deref(), &LISTING_SCOPE)?;
            let node = open_node(config)?;
            let page = node.audit_page(offset, count, reader.as_ref())?;
            let now = Timestamp::now().as_secs();
            for record in &page.records {
                let gate = match &record.location {
                    Some(c) => format!(
                        "  within {} of {}",
                        format_distance(c.radius_meters()),
                        format_coordinates(c.reference().lat(), c.reference().lon())
                    ),
                    None => String::new(),
                };
                println!(
                    "{:>6}  {}  {}  {}{}",
                    record.sequence,
                    record.fingerprint.to_hex(),
                    record.submitter.short(),
                    format_age(record.timestamp.as_secs(), now),
                    gate
                );
            }
            if let Some(next) = page.next_offset {
                eprintln!("more records: --offset {next}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Grant {
            fingerprint,
            grantee,
            key,
        } => access_change(config, AccessAction::Grant, &fingerprint, &grantee, &key),
        Command::Revoke {
            fingerprint,
            grantee,
            key,
        } => access_change(config, AccessAction::Revoke, &fingerprint, &grantee, &key),
        Command::Check {
            fingerprint,
            address,
            key,
        } => {
            let fp = parse_fingerprint(&fingerprint)?;
            let who = parse_address(&address)?;
            let reader = signed_read(key.as_deref(), &fp)?;
            let node = open_node(config)?;
            if node.can_access(&fp, &who, reader.as_ref())? {
                println!("allowed");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("denied");
                Ok(ExitCode::from(1))
            }
        }
        Command::Hide {
            fingerprint,
            key,
            undo,
        } => {
            let fp = parse_fingerprint(&fingerprint)?;
            let identity = keyfile::load(&key)?;
            let action = if undo { AccessAction::Unhide } else { AccessAction::Hide };
            let node = open_node(config)?;
            let nonce = node.authorization_nonce(&fp)?;
            let message = authorization_message(action, &fp, identity.address(), nonce);
            let request = SignedSuppression {
                fingerprint: fp,
                by: identity.address().clone(),
                nonce,
                signature: identity.sign(&message, identity.address())?,
            };
            let ack = if undo {
                node.unhide(&request)?
            } else {
                node.hide(&request)?
            };
            print_json(&serde_json::json!({ "ack": ack }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(config: NodeConfig) -> anyhow::Result<()> {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        addr = %config.rpc_addr(),
        policy = ?config.access.policy,
        metrics = config.enable_metrics,
        "starting DocGuard node"
    );
    let addr = config.rpc_addr();
    let node = Arc::new(open_node(config)?);
    let status = node.status()?;
    tracing::info!(records = status.records, suppressed = status.suppressed, "ledger opened");

    let shutdown = Arc::new(ShutdownController::new());
    let mut rx = shutdown.subscribe();
    let signals = Arc::clone(&shutdown);
    tokio::spawn(async move { signals.wait_for_signal().await });

    RpcServer::new(addr, Arc::clone(&node))
        .serve(async move {
            let _ = rx.recv().await;
        })
        .await?;

    let uptime = node.status()?.uptime_secs;
    tracing::info!(uptime = %format_duration(uptime), "DocGuard node exited cleanly");
    Ok(())
}

fn access_change(
    config: NodeConfig,
    action: AccessAction,
    fingerprint: &str,
    grantee: &str,
    key: &Path,
) -> anyhow::Result<ExitCode> {
    let fp = parse_fingerprint(fingerprint)?;
    let grantee = parse_address(grantee)?;
    let identity = keyfile::load(key)?;
    let node = open_node(config)?;
    let nonce = node.authorization_nonce(&fp)?;
    let message = authorization_message(action, &fp, &grantee, nonce);
    let change = SignedAccessChange {
        fingerprint: fp,
        grantee,
        by: identity.address().clone(),
        nonce,
        signature: identity.sign(&message, identity.address())?,
    };
    let ack = match action {
        AccessAction::Grant => node.grant(&change)?,
        _ => node.revoke(&change)?,
    };
    print_json(&serde_json::json!({ "ack": ack }))?;
    Ok(ExitCode::SUCCESS)
}

/// A read of `scope` signed with the key at `key`, if one was given.
fn signed_read(key: Option<&Path>, scope: &Fingerprint) -> anyhow::Result<Option<ReadAuthorization>> {
    let Some(path) = key else {
        return Ok(None);
    };
    let identity = keyfile::load(path)?;
    Ok(Some(ReadAuthorization::sign(&identity, scope, Timestamp::now())?))
}

/// Verify a file against the position given on the command line. With no
/// coordinates the requester reports none, which reads as `not_provided`.
fn verify_file(
    node: &DocGuardNode,
    file: &Path,
    key: Option<&Path>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> anyhow::Result<VerificationVerdict> {
    let fix = match (lat, lon) {
        (Some(lat), Some(lon)) => Some(LocationFix::position(GeoPoint::new(lat, lon)?)),
        _ => None,
    };
    let fp = file_fingerprint(file)?;
    let reader = signed_read(key, &fp)?;
    Ok(node.verify_fingerprint(fp, reader.as_ref(), fix)?)
}

fn file_fingerprint(path: &Path) -> anyhow::Result<Fingerprint> {
    fingerprint_file(path).with_context(|| format!("reading {}", path.display()))
}

fn verdict_exit_status(outcome: VerificationOutcome) -> u8 {
    match outcome {
        VerificationOutcome::Verified | VerificationOutcome::VerifiedNoLocationRequired => 0,
        VerificationOutcome::NotFound | VerificationOutcome::Tampered => 1,
        VerificationOutcome::VerifiedLocationFailed => 2,
        VerificationOutcome::VerifiedLocationIndeterminate => 3,
    }
}
