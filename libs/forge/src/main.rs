//! tzforge CLI - forge, sign and inspect Tezos operations offline

use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use num_bigint::{BigInt, BigUint};
use serde::Serialize;
use std::fs;
use std::io::Read;
use tzforge::{CurveKind, Key, expression, forge};

#[derive(Parser)]
#[command(name = "tzforge")]
#[command(about = "Offline Tezos operation forger and multi-curve signer", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forge operation contents, optionally signing them
    Forge {
        /// Branch block hash (B...)
        #[arg(short, long)]
        branch: String,

        /// Contents as JSON, `@file` or `-` for stdin
        contents: String,

        #[command(flatten)]
        key: KeySource,
    },
    /// Sign a hex message under the generic operation watermark
    Sign {
        /// Hex bytes to sign
        message: String,

        #[command(flatten)]
        key: KeySource,
    },
    /// Show the public key and address of a secret
    Show {
        #[command(flatten)]
        key: KeySource,

        /// Also print the secret key
        #[arg(long)]
        show_secret: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Compute the script expression hash of a big map key
    Expr {
        #[command(subcommand)]
        value: ExprCommand,
    },
    /// Generate a new key
    Generate {
        /// Curve of the new key
        #[arg(short, long, default_value = "ed25519")]
        curve: CurveKind,

        /// Derive from a fresh mnemonic with this many words instead of raw randomness
        #[arg(short, long)]
        words: Option<usize>,

        /// Encrypt the secret with the password
        #[arg(long)]
        encrypt: bool,

        /// Password for --encrypt
        #[arg(long, env = "TZFORGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum ExprCommand {
    /// `int` key
    Int {
        /// Decimal value
        #[arg(allow_hyphen_values = true)]
        value: BigInt,
    },
    /// `nat` key
    Nat {
        /// Decimal value
        value: BigUint,
    },
    /// `string` key
    String {
        /// Text value
        value: String,
    },
    /// `bytes` key
    Bytes {
        /// Hex value
        value: String,
    },
    /// `address` key
    Address {
        /// tz1, tz2, tz3 or KT1 address
        value: String,
    },
    /// `key_hash` key
    KeyHash {
        /// tz1, tz2 or tz3 address
        value: String,
    },
    /// Arbitrary Micheline JSON value
    Michelson {
        /// Micheline JSON, `@file` or `-` for stdin
        value: String,
    },
}

/// Where the signing key comes from
#[derive(Args)]
struct KeySource {
    /// Secret key (edsk/spsk/p2sk) or encrypted secret (edesk/spesk/p2esk)
    #[arg(short, long)]
    secret: Option<String>,

    /// BIP-39 mnemonic
    #[arg(short, long, conflicts_with = "secret")]
    mnemonic: Option<String>,

    /// Email mixed into the mnemonic passphrase
    #[arg(long, default_value = "", requires = "mnemonic")]
    email: String,

    /// Curve for mnemonic-derived keys
    #[arg(long, default_value = "ed25519")]
    curve: CurveKind,

    /// Password for an encrypted secret or mnemonic
    #[arg(long, env = "TZFORGE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl KeySource {
    fn load(&self) -> Result<Option<Key>, String> {
        let password = self.password.as_deref().unwrap_or_default();

        let key = match (&self.secret, &self.mnemonic) {
            (Some(secret), _) if is_encrypted(secret) => {
                if self.password.is_none() {
                    return Err("An encrypted secret needs --password or TZFORGE_PASSWORD".into());
                }
                Key::from_encrypted_secret(secret, password)
            }
            (Some(secret), _) => Key::from_b58_secret(secret, None),
            (None, Some(words)) => Key::from_mnemonic(words, &self.email, password, self.curve),
            (None, None) => return Ok(None),
        };

        key.map(Some).map_err(|e| format!("Failed to load key: {e}"))
    }

    fn require(&self) -> Result<Key, String> {
        self.load()?
            .ok_or_else(|| "A key is required: pass --secret or --mnemonic".to_string())
    }
}

fn is_encrypted(secret: &str) -> bool {
    ["edesk", "spesk", "p2esk"]
        .iter()
        .any(|tag| secret.starts_with(tag))
}

/// Read an argument that may be inline, `@path` or `-` for stdin
fn read_input(arg: &str) -> Result<String, String> {
    if arg == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        Ok(input)
    } else if let Some(path) = arg.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))
    } else {
        Ok(arg.to_string())
    }
}

#[derive(Serialize)]
struct KeyInfo {
    curve: String,
    address: String,
    public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mnemonic: Option<String>,
}

impl KeyInfo {
    fn new(key: &Key, secret_key: Option<String>) -> Self {
        Self {
            curve: key.curve().to_string(),
            address: key.address().to_b58check(),
            public_key: key.public_key_string(),
            secret_key,
            mnemonic: None,
        }
    }

    fn print(&self, json: bool) -> Result<(), String> {
        if json {
            let out = serde_json::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize: {e}"))?;
            println!("{out}");
            return Ok(());
        }

        println!("Curve:      {}", self.curve);
        println!("Address:    {}", self.address);
        println!("Public Key: {}", self.public_key);
        if let Some(secret_key) = &self.secret_key {
            println!("Secret Key: {secret_key}");
        }
        if let Some(mnemonic) = &self.mnemonic {
            println!("Mnemonic:   {mnemonic}");
        }
        Ok(())
    }
}

fn run_forge(branch: &str, contents: &str, key: &KeySource) -> Result<(), String> {
    let contents = read_input(contents)?;
    let forged = forge::forge_json(branch, &contents).map_err(|e| format!("Forging failed: {e}"))?;
    debug!("Forged {} bytes", forged.as_bytes().len());

    match key.load()? {
        None => println!("{}", forged.to_hex()),
        Some(key) => {
            let signed = forged
                .sign(&key)
                .map_err(|e| format!("Signing failed: {e}"))?;
            println!("Forged:    {}", forged.to_hex());
            println!("Signature: {}", signed.signature());
            println!("Signed:    {}", signed.to_hex());
            println!("Hash:      {}", signed.operation_hash());
        }
    }
    Ok(())
}

fn run_sign(message: &str, key: &KeySource) -> Result<(), String> {
    let key = key.require()?;
    let signature = key
        .sign_hex(message)
        .map_err(|e| format!("Signing failed: {e}"))?;
    info!("Signed with {}", key.address());
    println!("{signature}");
    println!("{}", signature.to_hex());
    Ok(())
}

fn run_expr(value: &ExprCommand) -> Result<(), String> {
    let expr = match value {
        ExprCommand::Int { value } => Ok(expression::int_expression(value.clone())),
        ExprCommand::Nat { value } => Ok(expression::nat_expression(value.clone())),
        ExprCommand::String { value } => Ok(expression::string_expression(value)),
        ExprCommand::Bytes { value } => expression::hex_bytes_expression(value),
        ExprCommand::Address { value } => expression::address_expression(value),
        ExprCommand::KeyHash { value } => expression::key_hash_expression(value),
        ExprCommand::Michelson { value } => expression::michelson_expression(&read_input(value)?),
    }
    .map_err(|e| format!("Hashing failed: {e}"))?;
    println!("{expr}");
    Ok(())
}

fn run_generate(
    curve: CurveKind,
    words: Option<usize>,
    encrypt: bool,
    password: Option<&str>,
) -> Result<(), String> {
    let (key, mnemonic) = match words {
        Some(count) => {
            let phrase = Key::generate_mnemonic(count).map_err(|e| e.to_string())?;
            let key = Key::from_mnemonic(&phrase, "", password.unwrap_or_default(), curve)
                .map_err(|e| format!("Key derivation failed: {e}"))?;
            (key, Some(phrase.to_string()))
        }
        None => (Key::generate(curve).map_err(|e| e.to_string())?, None),
    };

    let secret_key = if encrypt {
        let password =
            password.ok_or_else(|| "--encrypt needs --password or TZFORGE_PASSWORD".to_string())?;
        key.to_encrypted_secret(password)
            .map_err(|e| format!("Encryption failed: {e}"))?
    } else {
        key.secret_key().to_string()
    };

    let mut info = KeyInfo::new(&key, Some(secret_key));
    info.mnemonic = mnemonic;
    info.print(false)
}

fn init_logging(verbose: bool) {
    let log_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Forge {
            branch,
            contents,
            key,
        } => run_forge(&branch, &contents, &key),
        Commands::Sign { message, key } => run_sign(&message, &key),
        Commands::Show {
            key,
            show_secret,
            json,
        } => key.require().and_then(|key| {
            let secret_key = show_secret.then(|| key.secret_key().to_string());
            KeyInfo::new(&key, secret_key).print(json)
        }),
        Commands::Expr { value } => run_expr(&value),
        Commands::Generate {
            curve,
            words,
            encrypt,
            password,
        } => run_generate(curve, words, encrypt, password.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
