//! Cardsmith command-line tool.
//!
//! Packs deck JSON files into deck archives and unpacks them again.

use cardsmith_core::assets::FileAssetResolver;
use cardsmith_core::storage::FileSink;
use cardsmith_core::{Deck, DeckError, DeckImport, DeckTransfer, StorageError};
use std::path::{Path, PathBuf};
use std::{env, fs, process};
use thiserror::Error;

const USAGE: &str = "\
Usage:
  cardsmith pack <deck.json> [output-dir] [--assets <dir>]
  cardsmith unpack <deck.zip> <deck.json>
  cardsmith inspect <deck.zip>";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, PartialEq)]
enum Command {
    Pack {
        deck: PathBuf,
        output_dir: Option<PathBuf>,
        assets: Option<PathBuf>,
    },
    Unpack {
        archive: PathBuf,
        output: PathBuf,
    },
    Inspect {
        archive: PathBuf,
    },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self, CliError> {
        let usage = |msg: &str| CliError::Usage(format!("{}\n\n{}", msg, USAGE));
        let (name, rest) = args.split_first().ok_or_else(|| usage("missing command"))?;

        let mut positional = Vec::new();
        let mut assets = None;
        let mut iter = rest.iter();
        while let Some(arg) = iter.next() {
            if arg == "--assets" {
                let dir = iter.next().ok_or_else(|| usage("--assets needs a directory"))?;
                assets = Some(PathBuf::from(dir));
            } else {
                positional.push(PathBuf::from(arg));
            }
        }

        let mut positional = positional.into_iter();
        let command = match name.as_str() {
            "pack" => Command::Pack {
                deck: positional.next().ok_or_else(|| usage("pack needs a deck file"))?,
                output_dir: positional.next(),
                assets,
            },
            "unpack" => Command::Unpack {
                archive: positional.next().ok_or_else(|| usage("unpack needs an archive"))?,
                output: positional.next().ok_or_else(|| usage("unpack needs an output file"))?,
            },
            "inspect" => Command::Inspect {
                archive: positional.next().ok_or_else(|| usage("inspect needs an archive"))?,
            },
            other => return Err(usage(&format!("unknown command '{}'", other))),
        };
        if positional.next().is_some() {
            return Err(usage("too many arguments"));
        }
        Ok(command)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn import(transfer: &DeckTransfer, path: &Path) -> Result<DeckImport, CliError> {
    let import = transfer.import(&read(path)?)?;
    for missing in &import.missing {
        log::warn!("{} references {}, which is not in the archive", path.display(), missing);
    }
    Ok(import)
}

/// Returns the path of the written archive.
fn pack(
    transfer: &DeckTransfer,
    deck_path: &Path,
    output_dir: Option<&Path>,
    assets: Option<&Path>,
) -> Result<PathBuf, CliError> {
    let deck: Deck = serde_json::from_slice(&read(deck_path)?).map_err(|source| CliError::Json {
        path: deck_path.to_path_buf(),
        source,
    })?;

    let asset_dir = assets
        .map(Path::to_path_buf)
        .or_else(|| deck_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let resolver = FileAssetResolver::new(asset_dir);
    let sink = match output_dir {
        Some(dir) => FileSink::new(dir.to_path_buf())?,
        None => FileSink::default_location()?,
    };

    let filename = pollster::block_on(transfer.export_to(&deck, &resolver, &sink))?;
    Ok(sink.path_for(&filename))
}

fn unpack(transfer: &DeckTransfer, archive: &Path, output: &Path) -> Result<(), CliError> {
    let import = import(transfer, archive)?;
    let json = serde_json::to_string_pretty(&import.deck).map_err(|source| CliError::Json {
        path: output.to_path_buf(),
        source,
    })?;
    fs::write(output, json).map_err(|source| CliError::Io {
        path: output.to_path_buf(),
        source,
    })
}

fn describe(import: &DeckImport) -> String {
    let deck = &import.deck;
    let mut out = format!(
        "{}: {} cards, {} copies\n",
        deck.name,
        deck.cards.len(),
        deck.total_copies()
    );
    for (index, card) in deck.cards.iter().enumerate() {
        out.push_str(&format!(
            "  {:>3}. {} (x{}, {} images)\n",
            index + 1,
            card.name,
            card.count.unwrap_or(1),
            card.image_fields().count()
        ));
    }
    for missing in &import.missing {
        out.push_str(&format!("  missing: {}\n", missing));
    }
    out
}

fn run(command: Command) -> Result<(), CliError> {
    let transfer = DeckTransfer::new();
    match command {
        Command::Pack {
            deck,
            output_dir,
            assets,
        } => {
            let path = pack(&transfer, &deck, output_dir.as_deref(), assets.as_deref())?;
            println!("Wrote {}", path.display());
        }
        Command::Unpack { archive, output } => {
            unpack(&transfer, &archive, &output)?;
            println!("Wrote {}", output.display());
        }
        Command::Inspect { archive } => {
            print!("{}", describe(&import(&transfer, &archive)?));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = Command::parse(&args).and_then(run);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
