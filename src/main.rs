use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// MusicXML with the engraved accidentals
    Musicxml,
    /// JSON list of the accidental glyphs
    Json,
}

#[derive(Parser)]
#[command(name = "engrave")]
#[command(author, version, about = "Place accidentals and courtesy accidentals in a score", long_about = None)]
struct Cli {
    /// YAML score document
    input: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Musicxml)]
    format: Format,

    /// Skip measure length and pitch range validation
    #[arg(long)]
    no_validate: bool,
}

fn run(cli: &Cli) -> Result<String, engrave::EngraveError> {
    let source = fs::read_to_string(&cli.input)?;
    log::info!("Engraving {}", cli.input.display());

    let mut score = engrave::parse(&source)?;
    if !cli.no_validate {
        engrave::validate(&score)?;
    }
    engrave::engrave(&mut score);

    let output = match cli.format {
        Format::Musicxml => engrave::to_musicxml(&score),
        Format::Json => serde_json::to_string_pretty(&engrave::accidental_marks(&score))?,
    };
    Ok(output)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let output = match run(&cli) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &output) {
                eprintln!("Error writing to '{}': {}", path.display(), e);
                process::exit(1);
            }
            log::info!("Wrote {}", path.display());
        }
        None => {
            println!("{}", output);
        }
    }
}
