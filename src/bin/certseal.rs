#![allow(clippy::print_stderr, clippy::print_stdout)]

use certseal::keys::{ensure_keypair, key_paths};
use certseal::protocol::{Issuer, Verifier};
use certseal::record::CertificateMetadata;
use certseal::{CipherSuite, KeyPair, PrivateKey, ProtocolPolicy, SignedRecord};
use clap::{Args, Parser, Subcommand};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Issue and verify sealed certificate payloads", long_about = None)]
struct Cli {
    /// Directory holding the key pair
    #[arg(short, long, global = true, default_value = ".")]
    keys: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a key pair in the key directory, or reuse the one already there
    Keygen {
        /// RSA modulus size in bits
        #[arg(long, default_value_t = certseal::keys::DEFAULT_RSA_KEY_BITS)]
        bits: u32,
    },
    /// Seal a certificate record and print the payload
    Issue(IssueArgs),
    /// Open a payload and print its record if the signature holds
    Verify(VerifyArgs),
}

#[derive(Args)]
struct IssueArgs {
    /// Certificate ID
    #[arg(long)]
    id: String,

    /// Certificate holder name
    #[arg(long)]
    name: String,

    /// Issue date as it should appear on the certificate
    #[arg(long)]
    date: String,

    /// Course name
    #[arg(long, default_value = certseal::record::certificate::DEFAULT_COURSE)]
    course: String,

    /// Extra field appended after the standard ones
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// Append a `Created At` timestamp
    #[arg(long)]
    stamp: bool,

    /// Seal with AES-256-GCM instead of AES-256-CFB
    #[arg(long)]
    aead: bool,
}

#[derive(Args)]
struct VerifyArgs {
    /// Payload as scanned from the QR code
    #[arg(long, conflicts_with = "payload_file", required_unless_present = "payload_file")]
    payload: Option<String>,

    /// File containing the payload
    #[arg(long)]
    payload_file: Option<PathBuf>,

    /// Refuse payloads sealed without authenticated encryption
    #[arg(long)]
    aead_only: bool,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", raw)),
    }
}

// Prints fields in record order, signature last
struct RecordView<'a>(&'a SignedRecord);

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.0.record();
        let mut map = serializer.serialize_map(Some(record.len() + 1))?;
        for (key, value) in record.iter() {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(certseal::record::SIGNATURE_FIELD, self.0.signature())?;
        map.end()
    }
}

fn load_private_key(cli: &Cli, policy: &ProtocolPolicy) -> certseal::Result<PrivateKey> {
    let (private_path, _) = key_paths(&cli.keys, policy);
    PrivateKey::load(private_path)
}

fn issue(cli: &Cli, args: &IssueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut policy = ProtocolPolicy::new().with_created_at_stamp(args.stamp);
    if args.aead {
        policy = policy.with_cipher_suite(CipherSuite::Aes256Gcm);
    }

    let (private_path, public_path) = key_paths(&cli.keys, &policy);
    let keys = Arc::new(KeyPair::load(private_path, public_path)?);
    let issuer = Issuer::builder()
        .with_key_pair(keys)
        .with_policy(Arc::new(policy))
        .build()?;

    let mut record = CertificateMetadata::new(&args.id, &args.name, &args.date)
        .with_course(&args.course)
        .to_record();
    for (key, value) in &args.fields {
        record.insert(key, value)?;
    }

    let issued = issuer.issue(record)?;
    log::info!("issued certificate {} ({})", args.id, issued.suite);
    println!("{}", issued.payload);
    Ok(())
}

fn verify(cli: &Cli, args: &VerifyArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut policy = ProtocolPolicy::new();
    if args.aead_only {
        policy = policy.with_authenticated_cipher_only();
    }

    let payload = match (&args.payload, &args.payload_file) {
        (Some(payload), _) => payload.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("a payload is required".into()),
    };

    let verifier = Verifier::new(load_private_key(cli, &policy)?)?.with_policy(Arc::new(policy));
    match verifier.verify(&payload) {
        Ok(signed) => {
            let mut out = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
            RecordView(&signed).serialize(&mut serializer)?;
            println!("{}", String::from_utf8(out)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_rejection() => {
            eprintln!("certificate rejected: {}", e);
            Ok(ExitCode::from(1))
        }
        Err(e) => {
            eprintln!("could not verify: {}", e);
            Ok(ExitCode::from(2))
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match &cli.command {
        Commands::Keygen { bits } => {
            let policy = ProtocolPolicy::new().with_rsa_key_bits(*bits);
            let keys = ensure_keypair(&cli.keys, &policy)?;
            let (private_path, public_path) = key_paths(&cli.keys, &policy);
            println!(
                "{}-bit key pair ready: {} / {}",
                keys.private_key().bits(),
                private_path.display(),
                public_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Issue(args) => issue(cli, args).map(|()| ExitCode::SUCCESS),
        Commands::Verify(args) => verify(cli, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
