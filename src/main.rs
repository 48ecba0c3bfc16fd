use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use ndef_codec::ndef::{self, decode_tag_message, wrap_in_tlv};
use ndef_codec::types::MessageView;
use ndef_codec::{NdefMessage, VerifyConfig};

#[derive(Parser, Debug)]
#[command(name = "ndef", about = "Parse, verify and build NDEF messages")]
struct Cli {
    /// JSON file with verification settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum smart poster nesting depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Skip the Android rule requiring a type on the first record
    #[arg(long, global = true)]
    strict: bool,

    /// Hex is a tag dump: NDEF message inside a TLV
    #[arg(long, global = true)]
    tlv: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a hex-encoded message and print its records as JSON
    Parse {
        #[arg(value_name = "HEX")]
        input: String,
    },
    /// Build a single Text record message
    Text {
        text: String,
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// Build a single URI record message
    Uri { url: String },
    /// Build a smart poster (URI, action, optional title)
    SmartPoster {
        url: String,
        #[arg(long, default_value = "")]
        title: String,
    },
}

fn load_config(cli: &Cli) -> Result<VerifyConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            VerifyConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => VerifyConfig::default(),
    };
    if let Some(depth) = cli.max_depth {
        config.max_nesting_depth = depth;
    }
    if cli.strict {
        config.require_type_on_first_record = false;
    }
    Ok(config)
}

fn emit(message: &NdefMessage, tlv: bool) -> Result<()> {
    let mut bytes = message.to_bytes().context("encoding message")?;
    if tlv {
        bytes = wrap_in_tlv(&bytes).context("wrapping message in TLV")?;
    }
    println!("{}", hex::encode(bytes));
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    info!("verify config: {config:?}");

    match &cli.command {
        Command::Parse { input } => {
            let buf = hex::decode(input.trim()).context("input is not valid hex")?;
            let message = if cli.tlv {
                decode_tag_message(&buf, &config)
            } else {
                NdefMessage::from_bytes_with(&buf, &config)
            }
            .context("invalid NDEF")?;
            let view = MessageView::from(&message);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Text { text, lang } => emit(&ndef::new_text_message(lang, text)?, cli.tlv)?,
        Command::Uri { url } => emit(&ndef::new_uri_message(url)?, cli.tlv)?,
        Command::SmartPoster { url, title } => emit(&ndef::new_smart_poster(title, url)?, cli.tlv)?,
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("ndef: {err:#}");
        std::process::exit(1);
    }
}
