use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use enigma_core::{
    Machine, MachineSettings, Positions, RotorType, StepExplanation, derive_key_rng, secure_rng,
};
use env_logger::Env;
use log::{LevelFilter, debug};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "enigma",
    author,
    version,
    about = "Three-rotor Enigma I simulator"
)]
struct Cli {
    #[arg(long, global = true)]
    debug: bool,
    /// Optional JSON settings document to read the key from; individual
    /// flags below override it. The file is only read, never written.
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,
    /// Rotor order, left to right.
    #[arg(long, global = true, value_enum, value_delimiter = ',')]
    rotors: Option<Vec<RotorArg>>,
    /// Ring settings, left to right (e.g. AAA).
    #[arg(long, global = true)]
    rings: Option<String>,
    /// Start positions, left to right (e.g. AAA or A-A-A).
    #[arg(long, global = true)]
    positions: Option<String>,
    /// Plugboard cables, e.g. "AB CD EF".
    #[arg(long, global = true)]
    plugboard: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RotorArg {
    I,
    II,
    III,
    IV,
    V,
}

impl From<RotorArg> for RotorType {
    fn from(arg: RotorArg) -> Self {
        match arg {
            RotorArg::I => RotorType::I,
            RotorArg::II => RotorType::II,
            RotorArg::III => RotorType::III,
            RotorArg::IV => RotorType::IV,
            RotorArg::V => RotorType::V,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt (or, with the same key, decrypt) a message.
    #[command(alias = "decrypt")]
    Encrypt {
        #[arg(long, value_name = "TEXT")]
        message: Option<String>,
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Show every stage of the signal path for each letter.
    Trace {
        #[arg(long, value_name = "TEXT")]
        message: String,
        /// Print the recorded history as JSON instead of prose.
        #[arg(long)]
        json: bool,
    },
    /// Print a random key as a settings document.
    Keygen {
        /// Derive the key from a passphrase instead of the OS RNG.
        #[arg(long)]
        seed: Option<String>,
    },
    /// Encrypt with one machine and decrypt with a second, identically keyed one.
    Demo {
        #[arg(long, default_value = "ENIGMA REVEALS ITS SECRETS")]
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let settings = resolve_settings(&cli)?;
    match cli.command {
        Commands::Encrypt {
            message,
            input,
            out,
        } => cmd_encrypt(&settings, message, input, out),
        Commands::Trace { message, json } => cmd_trace(&settings, &message, json),
        Commands::Keygen { seed } => cmd_keygen(seed),
        Commands::Demo { message } => cmd_demo(&settings, &message),
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default));
    builder.format_timestamp(None);
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn resolve_settings(cli: &Cli) -> Result<MachineSettings> {
    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => MachineSettings::default(),
    };
    if let Some(rotors) = &cli.rotors {
        let order: [RotorArg; 3] = rotors
            .clone()
            .try_into()
            .map_err(|_| anyhow::anyhow!("--rotors takes exactly three rotors"))?;
        settings = settings.with_rotors(order.map(RotorType::from));
    }
    if let Some(rings) = &cli.rings {
        settings = settings.with_rings(parse_positions(rings, "--rings")?);
    }
    if let Some(positions) = &cli.positions {
        settings = settings.with_positions(parse_positions(positions, "--positions")?);
    }
    if let Some(plugboard) = &cli.plugboard {
        settings = settings.with_plugboard(plugboard.clone());
    }
    debug!(
        "settings positions={} rings={} plugboard=[{}]",
        settings.positions(),
        settings.rings(),
        settings.plugboard
    );
    Ok(settings)
}

fn build_machine(settings: &MachineSettings) -> Result<Machine> {
    settings.build().context("invalid machine settings")
}

fn cmd_encrypt(
    settings: &MachineSettings,
    message: Option<String>,
    input: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let plaintext = resolve_plaintext(message, input)?;
    let mut machine = build_machine(settings)?.with_history(false);
    let start = machine.positions();
    let ciphertext = machine.encrypt_message(&plaintext)?;
    match out {
        Some(path) => {
            fs::write(&path, &ciphertext)
                .with_context(|| format!("writing output to {}", path.display()))?;
            println!(
                "Wrote {} characters to {}",
                ciphertext.chars().count(),
                path.display()
            );
        }
        None => println!("{ciphertext}"),
    }
    println!("Rotors {} -> {}", start, machine.positions());
    Ok(())
}

fn cmd_trace(settings: &MachineSettings, message: &str, json: bool) -> Result<()> {
    let mut machine = build_machine(settings)?;
    let ciphertext = machine.encrypt_message(message)?;
    if json {
        println!("{}", serde_json::to_string_pretty(machine.history())?);
        return Ok(());
    }
    for entry in machine.history() {
        println!(
            "== {} -> {} (rotors {} -> {})",
            entry.input, entry.output, entry.positions_before, entry.positions_after
        );
        for step in entry.explain() {
            print_step(&step);
        }
        println!();
    }
    println!("Ciphertext: {ciphertext}");
    Ok(())
}

fn print_step(step: &StepExplanation) {
    println!(
        "{:>2}. {:<26} {} -> {}",
        step.number, step.title, step.input, step.output
    );
    println!("    {}", step.details);
}

fn cmd_keygen(seed: Option<String>) -> Result<()> {
    let settings = match seed {
        Some(seed) => MachineSettings::random(&mut derive_key_rng(seed.as_bytes(), b"keygen")),
        None => MachineSettings::random(&mut secure_rng()),
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn cmd_demo(settings: &MachineSettings, message: &str) -> Result<()> {
    let mut encoder = build_machine(settings)?;
    let mut decoder = build_machine(settings)?;
    println!(
        "Key: rotors {:?} rings {} start {} plugboard [{}]",
        encoder.rotors().names(),
        settings.rings(),
        settings.positions(),
        encoder.plugboard()
    );
    let ciphertext = encoder.encrypt_message(message)?;
    let recovered = decoder.encrypt_message(&ciphertext)?;
    println!("Plaintext:  {}", message.to_ascii_uppercase());
    println!("Ciphertext: {ciphertext}");
    println!("Decrypted:  {recovered}");
    if recovered != message.to_ascii_uppercase() {
        bail!("decryption did not reproduce the plaintext");
    }
    println!("Rotors ended at {} on both machines", encoder.positions());
    Ok(())
}

fn resolve_plaintext(message: Option<String>, input: Option<PathBuf>) -> Result<String> {
    match (message, input) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("reading message from {}", path.display())),
        (Some(_), Some(_)) => bail!("Provide either --message or --input, not both."),
        (None, None) => bail!("Provide --message TEXT or --input FILE."),
    }
}

fn parse_positions(text: &str, flag: &str) -> Result<Positions> {
    text.parse()
        .with_context(|| format!("parsing {flag} value '{text}'"))
}

fn load_settings(path: &Path) -> Result<MachineSettings> {
    let data = fs::read(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings = serde_json::from_slice(&data)
        .with_context(|| format!("parsing settings from {}", path.display()))?;
    Ok(settings)
}
