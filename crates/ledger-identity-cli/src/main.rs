//! ledger-identity CLI — `lid` command.
//!
//! Manages local parties and drives claim and attestation lifecycles
//! against a file-backed transaction store. Every transaction is signed,
//! checked by the verification engine and recorded in the local vault
//! before it is stored.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use ledger_identity::storage::{load_identity, read_party, save_identity, TransactionStore};
use ledger_identity::{
    AbstractParty, Attestation, AttestationAmendment, AttestationPointer, AttestationStatus,
    ChainId, Claim, Command, ContractState, LedgerTransaction, LifecycleCommand, LinearPointer,
    LinearState, LocalIdentity, Metadata, Party, Pointer, QueryCriteria, Record, SecureHash,
    SignedTransaction, StateAndRef, TransactionBuilder, Vault, VerificationEngine,
};

/// Claims issued from the command line carry arbitrary JSON values.
type JsonClaim = Claim<serde_json::Value>;
type ClaimAttestation = Attestation<JsonClaim>;

// ── Directory helpers ─────────────────────────────────────────────────────────

const HOME_ENV: &str = "LEDGER_IDENTITY_HOME";
const PASSPHRASE_ENV: &str = "LEDGER_IDENTITY_PASSPHRASE";

fn ledger_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").with_context(|| format!("neither {HOME_ENV} nor HOME is set"))?;
    Ok(PathBuf::from(home).join(".ledger-identity"))
}

fn parties_dir() -> Result<PathBuf> {
    Ok(ledger_dir()?.join("parties"))
}

fn transactions_dir() -> Result<PathBuf> {
    Ok(ledger_dir()?.join("transactions"))
}

fn party_path(name: &str) -> Result<PathBuf> {
    Ok(parties_dir()?.join(format!("{name}.key")))
}

// ── Passphrase helper ─────────────────────────────────────────────────────────

/// Read a passphrase from `LEDGER_IDENTITY_PASSPHRASE`, or prompt on stdin.
fn read_passphrase(prompt: &str) -> Result<String> {
    if let Ok(passphrase) = std::env::var(PASSPHRASE_ENV) {
        return Ok(passphrase);
    }
    eprint!("{prompt}");
    let mut passphrase = String::new();
    std::io::stdin()
        .read_line(&mut passphrase)
        .context("failed to read passphrase")?;
    Ok(passphrase.trim().to_string())
}

fn unlock(name: &str) -> Result<LocalIdentity> {
    let path = party_path(name)?;
    if !path.exists() {
        bail!("party '{}' not found (expected at {})", name, path.display());
    }
    let passphrase = read_passphrase(&format!("Passphrase for party '{name}': "))?;
    load_identity(&path, &passphrase).context("failed to load party (wrong passphrase?)")
}

fn lookup_party(name: &str) -> Result<Party> {
    let path = party_path(name)?;
    if !path.exists() {
        bail!("party '{}' not found (expected at {})", name, path.display());
    }
    read_party(&path).with_context(|| format!("failed to read party '{name}'"))
}

// ── Formatting helpers ────────────────────────────────────────────────────────

fn micros_to_datetime(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn party_label(party: &AbstractParty) -> String {
    match party.name() {
        Some(name) => name.to_string(),
        None => party.owning_key().fingerprint(),
    }
}

fn chain_label(chain_id: &ChainId) -> String {
    match &chain_id.external_id {
        Some(ext) => format!("{} ({ext})", chain_id.id),
        None => chain_id.id.to_string(),
    }
}

// ── Argument parsing helpers ──────────────────────────────────────────────────

/// Parse a claim value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn parse_metadata(entries: &[String]) -> Result<Vec<(String, String)>> {
    entries
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("metadata entry '{entry}' must be key=value"))
        })
        .collect()
}

fn parse_status(raw: &str) -> Result<AttestationStatus> {
    raw.parse::<AttestationStatus>().map_err(|e| anyhow!(e))
}

// ── Ledger session ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("no live {kind} matches chain '{prefix}'")]
    NotFound { kind: &'static str, prefix: String },

    #[error("chain '{prefix}' is ambiguous: {count} live {kind} records match")]
    Ambiguous {
        kind: &'static str,
        prefix: String,
        count: usize,
    },
}

fn chain_matches(chain_id: &ChainId, prefix: &str) -> bool {
    chain_id.id.to_string().starts_with(prefix) || chain_id.external_id.as_deref() == Some(prefix)
}

/// The stored transactions, replayed into a vault.
struct Ledger {
    store: TransactionStore,
    vault: Vault,
    engine: VerificationEngine,
}

impl Ledger {
    fn open() -> Result<Self> {
        let store =
            TransactionStore::new(transactions_dir()?).context("failed to open transaction store")?;
        let mut vault = Vault::new();
        for signed in store.load_all().context("failed to load transactions")? {
            vault
                .record_transaction(&signed.tx)
                .with_context(|| format!("failed to replay transaction {}", signed.id()))?;
        }
        Ok(Self {
            store,
            vault,
            engine: VerificationEngine::standard(),
        })
    }

    /// Sign, verify, record and store a transaction.
    fn commit(&mut self, identity: &LocalIdentity, tx: LedgerTransaction) -> Result<SecureHash> {
        let signed = SignedTransaction::new(tx).sign(identity);
        signed
            .verify(&self.engine)
            .context("transaction rejected")?;
        self.vault
            .record_transaction(&signed.tx)
            .context("transaction conflicts with the local vault")?;
        self.store
            .save(&signed)
            .context("failed to store transaction")?;
        log::info!("committed transaction {}", signed.id());
        Ok(*signed.id())
    }

    /// The live (unconsumed) record of type `S` whose chain id starts
    /// with `prefix` or whose external id equals it.
    fn head<S: LinearState>(&self, kind: &'static str, prefix: &str) -> Result<Record<S>> {
        let mut matches: Vec<StateAndRef> = self
            .vault
            .query(&QueryCriteria::unconsumed().of_type::<S>())
            .into_iter()
            .filter(|sr| {
                sr.state
                    .chain_id
                    .as_ref()
                    .is_some_and(|c| chain_matches(c, prefix))
            })
            .collect();
        match matches.len() {
            0 => Err(LookupError::NotFound {
                kind,
                prefix: prefix.to_string(),
            }
            .into()),
            1 => Ok(matches.remove(0).decode::<S>()?),
            count => Err(LookupError::Ambiguous {
                kind,
                prefix: prefix.to_string(),
                count,
            }
            .into()),
        }
    }

    fn live<S: ContractState>(&self) -> Result<Vec<Record<S>>> {
        self.vault
            .query(&QueryCriteria::unconsumed().of_type::<S>())
            .iter()
            .map(|sr| sr.decode::<S>().map_err(Into::into))
            .collect()
    }
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// ledger-identity CLI — manage parties, claims and attestations on a
/// local file-backed ledger.
#[derive(Parser, Debug)]
#[command(
    name = "lid",
    about = "ledger-identity CLI",
    version,
    long_about = "lid — ledger-identity CLI\n\nCreate parties, issue and amend claims, attest records,\nand verify the local transaction log."
)]
struct Cli {
    /// Act as this party (default: default)
    #[arg(long, global = true, default_value = "default")]
    party: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage local parties
    Party {
        #[command(subcommand)]
        subcommand: PartyCommands,
    },

    /// Issue, amend and revoke claims
    Claim {
        #[command(subcommand)]
        subcommand: ClaimCommands,
    },

    /// Issue, amend and revoke attestations of claims
    Attest {
        #[command(subcommand)]
        subcommand: AttestCommands,
    },

    /// Inspect and verify the transaction log
    Ledger {
        #[command(subcommand)]
        subcommand: LedgerCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PartyCommands {
    /// Create a new party key file
    Create {
        /// Name for the new party (overrides --party)
        #[arg(long)]
        name: Option<String>,
    },

    /// Display a party
    Show {
        /// Party to show (overrides --party)
        #[arg(long)]
        name: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all local parties
    List,
}

#[derive(Subcommand, Debug)]
enum ClaimCommands {
    /// Issue a new claim as the acting party
    Issue {
        /// Property name, e.g. "age"
        #[arg(long)]
        property: String,

        /// Value as JSON (plain text is stored as a string)
        #[arg(long)]
        value: String,

        /// Holder party name (default: the issuer)
        #[arg(long)]
        holder: Option<String>,

        /// External id to label the claim's chain
        #[arg(long)]
        external_id: Option<String>,
    },

    /// Amend the value of a live claim
    Amend {
        /// Chain id (or unique prefix, or external id) of the claim
        #[arg(long)]
        chain: String,

        /// New value as JSON
        #[arg(long)]
        value: String,
    },

    /// Revoke a live claim
    Revoke {
        /// Chain id (or unique prefix, or external id) of the claim
        #[arg(long)]
        chain: String,
    },

    /// List live claims
    List,
}

#[derive(Subcommand, Debug)]
enum AttestCommands {
    /// Attest a live claim as the acting party
    Issue {
        /// Chain id (or unique prefix, or external id) of the claim
        #[arg(long)]
        claim: String,

        /// Witness the current version only instead of the whole chain
        #[arg(long)]
        exact: bool,

        /// Dispute the claim instead of accepting it
        #[arg(long)]
        reject: bool,

        /// Metadata entry as key=value (repeatable)
        #[arg(long = "meta")]
        metadata: Vec<String>,
    },

    /// Amend a live attestation
    Amend {
        /// Chain id (or unique prefix) of the attestation
        #[arg(long)]
        chain: String,

        /// New status (accepted, rejected); unchanged if omitted
        #[arg(long)]
        status: Option<String>,

        /// Replacement metadata as key=value (repeatable); unchanged if omitted
        #[arg(long = "meta")]
        metadata: Vec<String>,

        /// Move an exact attestation to the claim's current version
        #[arg(long)]
        refresh: bool,
    },

    /// Revoke a live attestation
    Revoke {
        /// Chain id (or unique prefix) of the attestation
        #[arg(long)]
        chain: String,
    },

    /// List live attestations and what they currently witness
    List,
}

#[derive(Subcommand, Debug)]
enum LedgerCommands {
    /// List stored transactions
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-verify every stored transaction
    Verify,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;
    let party = cli.party.clone();

    let result = match cli.command {
        Commands::Party { subcommand } => match subcommand {
            PartyCommands::Create { name } => cmd_party_create(&name.unwrap_or(party), verbose),
            PartyCommands::Show { name, json } => cmd_party_show(&name.unwrap_or(party), json),
            PartyCommands::List => cmd_party_list(),
        },
        Commands::Claim { subcommand } => match subcommand {
            ClaimCommands::Issue {
                property,
                value,
                holder,
                external_id,
            } => cmd_claim_issue(
                &party,
                &property,
                &value,
                holder.as_deref(),
                external_id,
                verbose,
            ),
            ClaimCommands::Amend { chain, value } => cmd_claim_amend(&party, &chain, &value, verbose),
            ClaimCommands::Revoke { chain } => cmd_claim_revoke(&party, &chain),
            ClaimCommands::List => cmd_claim_list(verbose),
        },
        Commands::Attest { subcommand } => match subcommand {
            AttestCommands::Issue {
                claim,
                exact,
                reject,
                metadata,
            } => cmd_attest_issue(&party, &claim, exact, reject, &metadata, verbose),
            AttestCommands::Amend {
                chain,
                status,
                metadata,
                refresh,
            } => cmd_attest_amend(&party, &chain, status.as_deref(), &metadata, refresh),
            AttestCommands::Revoke { chain } => cmd_attest_revoke(&party, &chain),
            AttestCommands::List => cmd_attest_list(verbose),
        },
        Commands::Ledger { subcommand } => match subcommand {
            LedgerCommands::List { json } => cmd_ledger_list(json),
            LedgerCommands::Verify => cmd_ledger_verify(verbose),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ── Party commands ────────────────────────────────────────────────────────────

fn cmd_party_create(name: &str, verbose: bool) -> Result<()> {
    let path = party_path(name)?;
    if path.exists() {
        bail!("party '{}' already exists at {}", name, path.display());
    }

    std::fs::create_dir_all(parties_dir()?).context("failed to create parties directory")?;

    let passphrase = read_passphrase("Enter passphrase for new party: ")?;
    if passphrase.is_empty() {
        bail!("passphrase cannot be empty");
    }
    if std::env::var(PASSPHRASE_ENV).is_err() {
        let confirm = read_passphrase("Confirm passphrase: ")?;
        if passphrase != confirm {
            bail!("passphrases do not match");
        }
    }

    let identity = LocalIdentity::new(name);
    save_identity(&identity, &path, &passphrase).context("failed to save party")?;

    println!("Created party '{name}'");
    println!("  Key:  {}", identity.public_key());
    println!("  File: {}", path.display());
    if verbose {
        println!("  Created: {}", micros_to_datetime(identity.created_at));
    }
    Ok(())
}

#[derive(Serialize)]
struct PartySummary<'a> {
    name: &'a str,
    owning_key: String,
    fingerprint: String,
    file: String,
}

fn cmd_party_show(name: &str, json: bool) -> Result<()> {
    let party = lookup_party(name)?;
    let summary = PartySummary {
        name: &party.name,
        owning_key: party.owning_key.to_base64(),
        fingerprint: party.owning_key.fingerprint(),
        file: party_path(name)?.display().to_string(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Party: {}", summary.name);
    println!("  Key:         {}", summary.owning_key);
    println!("  Fingerprint: {}", summary.fingerprint);
    println!("  File:        {}", summary.file);
    Ok(())
}

fn cmd_party_list() -> Result<()> {
    let dir = parties_dir()?;
    if !dir.exists() {
        println!("No parties found (directory {} does not exist)", dir.display());
        return Ok(());
    }

    let mut names: Vec<String> = std::fs::read_dir(&dir)
        .context("failed to read parties directory")?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            if path.extension().is_some_and(|x| x == "key") {
                Some(path.file_stem()?.to_string_lossy().into_owned())
            } else {
                None
            }
        })
        .collect();
    names.sort();

    if names.is_empty() {
        println!("No parties found in {}", dir.display());
        return Ok(());
    }

    println!("{:<20} FINGERPRINT", "NAME");
    println!("{}", "-".repeat(48));
    for name in &names {
        match lookup_party(name) {
            Ok(party) => println!("{:<20} {}", name, party.owning_key.fingerprint()),
            Err(e) => println!("{:<20} (failed to read: {e:#})", name),
        }
    }
    Ok(())
}

// ── Claim commands ────────────────────────────────────────────────────────────

fn cmd_claim_issue(
    party: &str,
    property: &str,
    value: &str,
    holder: Option<&str>,
    external_id: Option<String>,
    verbose: bool,
) -> Result<()> {
    let identity = unlock(party)?;
    let holder = match holder {
        Some(name) => lookup_party(name)?,
        None => identity.party(),
    };

    let mut builder = Claim::builder(identity.party(), property, parse_value(value)).holder(holder);
    if let Some(ext) = external_id {
        builder = builder.chain_id(ChainId::with_external_id(ext));
    }
    let claim = builder.build();

    let tx = TransactionBuilder::new()
        .output(&claim)?
        .command(Command::for_state::<JsonClaim>(
            LifecycleCommand::Issue,
            vec![identity.public_key()],
        ))
        .build();

    let mut ledger = Ledger::open()?;
    let tx_id = ledger.commit(&identity, tx)?;

    println!("Issued claim '{}' = {}", claim.property(), claim.value());
    println!("  Chain:       {}", chain_label(claim.linear_id()));
    println!("  Holder:      {}", party_label(claim.holder()));
    println!("  Transaction: {tx_id}");
    if verbose {
        println!("  Hash:        {}", claim.compute_hash());
    }
    Ok(())
}

fn cmd_claim_amend(party: &str, chain: &str, value: &str, verbose: bool) -> Result<()> {
    let identity = unlock(party)?;
    let mut ledger = Ledger::open()?;
    let current = ledger.head::<JsonClaim>("claim", chain)?;
    let amended = current.state.amend(current.reference, parse_value(value));

    let tx = TransactionBuilder::new()
        .input(&current)?
        .output(&amended)?
        .command(Command::for_state::<JsonClaim>(
            LifecycleCommand::Amend,
            vec![identity.public_key()],
        ))
        .build();
    let tx_id = ledger.commit(&identity, tx)?;

    println!(
        "Amended claim '{}': {} -> {}",
        amended.property(),
        current.state.value(),
        amended.value()
    );
    println!("  Chain:       {}", chain_label(amended.linear_id()));
    println!("  Transaction: {tx_id}");
    if verbose {
        println!("  Replaces:    {}", current.reference);
    }
    Ok(())
}

fn cmd_claim_revoke(party: &str, chain: &str) -> Result<()> {
    let identity = unlock(party)?;
    let mut ledger = Ledger::open()?;
    let current = ledger.head::<JsonClaim>("claim", chain)?;

    let tx = TransactionBuilder::new()
        .input(&current)?
        .command(Command::for_state::<JsonClaim>(
            LifecycleCommand::Revoke,
            vec![identity.public_key()],
        ))
        .build();
    let tx_id = ledger.commit(&identity, tx)?;

    println!("Revoked claim '{}'", current.state.property());
    println!("  Chain:       {}", chain_label(current.state.linear_id()));
    println!("  Transaction: {tx_id}");
    Ok(())
}

fn cmd_claim_list(verbose: bool) -> Result<()> {
    let ledger = Ledger::open()?;
    let claims = ledger.live::<JsonClaim>()?;
    if claims.is_empty() {
        println!("No live claims");
        return Ok(());
    }

    println!(
        "{:<38} {:<16} {:<16} {:<16} VALUE",
        "CHAIN", "PROPERTY", "ISSUER", "HOLDER"
    );
    println!("{}", "-".repeat(100));
    for record in &claims {
        let claim = &record.state;
        println!(
            "{:<38} {:<16} {:<16} {:<16} {}",
            claim.linear_id().id,
            claim.property(),
            party_label(claim.issuer()),
            party_label(claim.holder()),
            claim.value()
        );
        if verbose {
            println!("  record {}", record.reference);
        }
    }
    Ok(())
}

// ── Attestation commands ──────────────────────────────────────────────────────

fn cmd_attest_issue(
    party: &str,
    claim_chain: &str,
    exact: bool,
    reject: bool,
    metadata: &[String],
    verbose: bool,
) -> Result<()> {
    let identity = unlock(party)?;
    let mut ledger = Ledger::open()?;
    let target = ledger.head::<JsonClaim>("claim", claim_chain)?;

    let pointer = if exact {
        AttestationPointer::static_to(&target)
    } else {
        AttestationPointer::linear_to(&target)
    };
    let status = if reject {
        AttestationStatus::Rejected
    } else {
        AttestationStatus::Accepted
    };

    let mut builder = ClaimAttestation::builder(identity.party(), pointer)
        .attestee(target.state.holder().clone())
        .status(status);
    for (key, value) in parse_metadata(metadata)? {
        builder = builder.metadata(key, value);
    }
    let attestation = builder.build()?;

    let tx = TransactionBuilder::new()
        .output(&attestation)?
        .reference(&target)?
        .command(Command::for_state::<ClaimAttestation>(
            LifecycleCommand::Issue,
            vec![identity.public_key()],
        ))
        .build();
    let tx_id = ledger.commit(&identity, tx)?;

    println!(
        "Attested claim '{}' as {}",
        target.state.property(),
        attestation.status()
    );
    println!("  Chain:       {}", chain_label(attestation.linear_id()));
    println!(
        "  Witnesses:   {}",
        if exact { "this version only" } else { "every version" }
    );
    println!("  Transaction: {tx_id}");
    if verbose {
        println!("  Pointer:     {}", attestation.pointer().hash());
    }
    Ok(())
}

fn cmd_attest_amend(
    party: &str,
    chain: &str,
    status: Option<&str>,
    metadata: &[String],
    refresh: bool,
) -> Result<()> {
    let identity = unlock(party)?;
    let mut ledger = Ledger::open()?;
    let current = ledger.head::<ClaimAttestation>("attestation", chain)?;

    let status = match status {
        Some(raw) => parse_status(raw)?,
        None => current.state.status(),
    };
    let metadata = if metadata.is_empty() {
        current.state.metadata().clone()
    } else {
        Metadata::from_pairs(parse_metadata(metadata)?)?
    };

    let mut amendment = AttestationAmendment::new(status).metadata(metadata);
    if refresh {
        amendment = amendment.pointer(refreshed_pointer(&ledger, current.state.pointer())?);
    }
    let amended = current.state.amend(current.reference, amendment);

    let tx = TransactionBuilder::new()
        .input(&current)?
        .output(&amended)?
        .command(Command::for_state::<ClaimAttestation>(
            LifecycleCommand::Amend,
            vec![identity.public_key()],
        ))
        .build();
    let tx_id = ledger.commit(&identity, tx)?;

    println!("Amended attestation (status: {})", amended.status());
    println!("  Chain:       {}", chain_label(amended.linear_id()));
    println!("  Transaction: {tx_id}");
    Ok(())
}

/// An exact pointer moved to the newest version of the claim it witnesses.
fn refreshed_pointer(
    ledger: &Ledger,
    pointer: &AttestationPointer<JsonClaim>,
) -> Result<AttestationPointer<JsonClaim>> {
    let AttestationPointer::Static(exact) = pointer else {
        bail!("only exact attestations can be refreshed; linear ones always follow the claim");
    };
    let witnessed = ledger
        .vault
        .get(exact.record_ref())
        .ok_or_else(|| anyhow!("witnessed record {} is not in the vault", exact.record_ref()))?
        .decode::<JsonClaim>()?;
    let head = LinearPointer::<JsonClaim>::new(witnessed.state.linear_id().clone())
        .resolve_local(&ledger.vault)?
        .ok_or_else(|| anyhow!("the witnessed claim has been revoked"))?;
    Ok(AttestationPointer::static_to(&head))
}

fn cmd_attest_revoke(party: &str, chain: &str) -> Result<()> {
    let identity = unlock(party)?;
    let mut ledger = Ledger::open()?;
    let current = ledger.head::<ClaimAttestation>("attestation", chain)?;

    let tx = TransactionBuilder::new()
        .input(&current)?
        .command(Command::for_state::<ClaimAttestation>(
            LifecycleCommand::Revoke,
            vec![identity.public_key()],
        ))
        .build();
    let tx_id = ledger.commit(&identity, tx)?;

    println!("Revoked attestation");
    println!("  Chain:       {}", chain_label(current.state.linear_id()));
    println!("  Transaction: {tx_id}");
    Ok(())
}

fn cmd_attest_list(verbose: bool) -> Result<()> {
    let ledger = Ledger::open()?;
    let attestations = ledger.live::<ClaimAttestation>()?;
    if attestations.is_empty() {
        println!("No live attestations");
        return Ok(());
    }

    println!(
        "{:<38} {:<16} {:<9} {:<6} WITNESSES",
        "CHAIN", "ATTESTOR", "STATUS", "KIND"
    );
    println!("{}", "-".repeat(100));
    for record in &attestations {
        let attestation = &record.state;
        let witnessed = match attestation.pointer().resolve_local(&ledger.vault) {
            Ok(Some(claim)) => format!("{} = {}", claim.state.property(), claim.state.value()),
            Ok(None) => "(no live record)".to_string(),
            Err(e) => format!("(unresolvable: {e})"),
        };
        println!(
            "{:<38} {:<16} {:<9} {:<6} {}",
            attestation.linear_id().id,
            party_label(attestation.attestor()),
            attestation.status(),
            if attestation.pointer().is_linear() {
                "chain"
            } else {
                "exact"
            },
            witnessed
        );
        if verbose {
            for (key, value) in attestation.metadata().iter() {
                println!("  {key} = {value}");
            }
        }
    }
    Ok(())
}

// ── Ledger commands ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TransactionSummary {
    id: String,
    recorded_at: String,
    inputs: usize,
    outputs: usize,
    references: usize,
    commands: Vec<String>,
}

fn cmd_ledger_list(json: bool) -> Result<()> {
    let store = TransactionStore::new(transactions_dir()?).context("failed to open transaction store")?;
    let mut summaries = Vec::new();
    for signed in store.load_all().context("failed to load transactions")? {
        let tx = &signed.tx;
        summaries.push(TransactionSummary {
            id: tx.id.to_hex(),
            recorded_at: micros_to_datetime(store.recorded_at(&tx.id)?),
            inputs: tx.inputs.len(),
            outputs: tx.outputs.len(),
            references: tx.references.len(),
            commands: tx
                .commands
                .iter()
                .map(|c| format!("{} {}", c.action, c.family))
                .collect(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No transactions recorded");
        return Ok(());
    }

    println!("{:<18} {:<24} {:>3} {:>3} COMMANDS", "ID", "RECORDED", "IN", "OUT");
    println!("{}", "-".repeat(90));
    for s in &summaries {
        println!(
            "{:<18} {:<24} {:>3} {:>3} {}",
            &s.id[..16],
            s.recorded_at,
            s.inputs,
            s.outputs,
            s.commands.join(", ")
        );
    }
    Ok(())
}

fn cmd_ledger_verify(verbose: bool) -> Result<()> {
    let store = TransactionStore::new(transactions_dir()?).context("failed to open transaction store")?;
    let engine = VerificationEngine::standard();
    let mut vault = Vault::new();
    let mut failures = 0usize;
    let transactions = store.load_all().context("failed to load transactions")?;

    for signed in &transactions {
        let outcome = signed
            .verify(&engine)
            .and_then(|()| vault.record_transaction(&signed.tx));
        match outcome {
            Ok(()) => {
                if verbose {
                    println!("  ok      {}", signed.id());
                }
            }
            Err(e) => {
                failures += 1;
                println!("  FAILED  {}: {e}", signed.id());
            }
        }
    }

    println!(
        "Verified {} transaction(s): {} valid, {} invalid",
        transactions.len(),
        transactions.len() - failures,
        failures
    );
    println!(
        "  Live records: {} of {}",
        vault.unconsumed_len(),
        vault.len()
    );
    if failures > 0 {
        bail!("{failures} transaction(s) failed verification");
    }
    Ok(())
}
