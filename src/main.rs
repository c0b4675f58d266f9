//! Command-line interface for printschema

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use printschema::capabilities::{CapabilityFeature, ParameterName};
#[cfg(feature = "cli")]
use printschema::loaders::Loader;
#[cfg(feature = "cli")]
use printschema::locations::Location;
#[cfg(feature = "cli")]
use printschema::provider::{BaseDevModeType, ConflictStatus, PrintTicketScope};
#[cfg(feature = "cli")]
use printschema::schema::enums::{Duplexing, PageMediaSizeName, PageOrientation};
#[cfg(feature = "cli")]
use printschema::schema::{SchemaEnum, UNSPECIFIED_INT};
#[cfg(feature = "cli")]
use printschema::{InProcessProvider, Limits, PrintCapabilities, PrintTicket, PrintTicketConverter};

#[cfg(feature = "cli")]
type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "printschema")]
#[command(author, version, about = "Print Schema capabilities, ticket and DEVMODE tool", long_about = None)]
struct Cli {
    /// JSON file overriding the XML resource limits
    #[arg(long, global = true, value_name = "FILE")]
    limits: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize a PrintCapabilities document
    Caps {
        /// Path to the capabilities document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Summarize the settings of a PrintTicket
    Ticket {
        /// Path to the ticket
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check that a PrintTicket is well formed
    Check {
        /// Path to the ticket
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Change settings of a PrintTicket
    Set {
        /// Path to the ticket
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Duplex keyword, e.g. TwoSidedLongEdge
        #[arg(long)]
        duplex: Option<String>,

        /// Number of copies
        #[arg(long)]
        copies: Option<i32>,

        /// Orientation keyword, e.g. Landscape
        #[arg(long)]
        orientation: Option<String>,

        /// Media size keyword, e.g. ISOA4
        #[arg(long)]
        media_size: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a delta ticket into a base ticket and validate it
    Merge {
        /// Path to the base ticket
        #[arg(value_name = "BASE")]
        base: PathBuf,

        /// Path to the delta ticket
        #[arg(short, long)]
        delta: Option<PathBuf>,

        /// Capabilities the result is validated against
        #[arg(short, long, value_name = "FILE")]
        capabilities: PathBuf,

        /// Scope: page, document or job
        #[arg(short, long, default_value = "job")]
        scope: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a PrintTicket to a DEVMODE buffer
    Devmode {
        /// Path to the ticket
        #[arg(value_name = "TICKET")]
        ticket: PathBuf,

        /// Capabilities of the target device
        #[arg(short, long, value_name = "FILE")]
        capabilities: PathBuf,

        /// Start from the printer default instead of the user default
        #[arg(long)]
        printer_default: bool,

        /// Output file for the DEVMODE bytes
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a DEVMODE buffer to a PrintTicket
    #[command(name = "from-devmode")]
    FromDevmode {
        /// Path to the DEVMODE bytes
        #[arg(value_name = "DEVMODE")]
        devmode: PathBuf,

        /// Capabilities of the target device
        #[arg(short, long, value_name = "FILE")]
        capabilities: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_limits(cli.limits.as_deref()).and_then(|limits| {
        let loader = Loader::new().with_limits(limits);
        match cli.command {
            Commands::Caps { file, json } => cmd_caps(&loader, &file, json),
            Commands::Ticket { file, json } => cmd_ticket(&loader, &file, json),
            Commands::Check { file } => cmd_check(&loader, &file),
            Commands::Set {
                file,
                duplex,
                copies,
                orientation,
                media_size,
                output,
            } => cmd_set(&loader, &file, duplex, copies, orientation, media_size, output),
            Commands::Merge {
                base,
                delta,
                capabilities,
                scope,
                output,
            } => cmd_merge(&loader, &base, delta.as_deref(), &capabilities, &scope, output),
            Commands::Devmode {
                ticket,
                capabilities,
                printer_default,
                output,
            } => cmd_devmode(&loader, &ticket, &capabilities, printer_default, &output),
            Commands::FromDevmode {
                devmode,
                capabilities,
                output,
            } => cmd_from_devmode(&loader, &devmode, &capabilities, output),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn load_limits(path: Option<&Path>) -> CliResult<Limits> {
    match path {
        Some(path) => Ok(Limits::from_json(&fs::read_to_string(path)?)?),
        None => Ok(Limits::default()),
    }
}

#[cfg(feature = "cli")]
fn read(loader: &Loader, path: &Path) -> CliResult<Vec<u8>> {
    Ok(loader.load_bytes(&Location::path(path))?)
}

#[cfg(feature = "cli")]
fn load_ticket(loader: &Loader, path: &Path) -> CliResult<PrintTicket> {
    Ok(PrintTicket::parse_with_limits(&read(loader, path)?, loader.limits())?)
}

#[cfg(feature = "cli")]
fn write_output(output: Option<PathBuf>, bytes: &[u8]) -> CliResult {
    match output {
        Some(path) => {
            fs::write(&path, bytes)?;
            eprintln!("Written to {}", path.display());
        }
        None => print!("{}", String::from_utf8_lossy(bytes)),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn parse_keyword<T: SchemaEnum>(what: &str, keyword: &str) -> CliResult<T> {
    T::from_keyword(keyword)
        .ok_or_else(|| format!("unknown {} keyword '{}'", what, keyword).into())
}

#[cfg(feature = "cli")]
fn parse_scope(scope: &str) -> CliResult<PrintTicketScope> {
    match scope.to_ascii_lowercase().as_str() {
        "page" => Ok(PrintTicketScope::Page),
        "document" => Ok(PrintTicketScope::Document),
        "job" => Ok(PrintTicketScope::Job),
        other => Err(format!("unknown scope '{}'. Use: page, document, job", other).into()),
    }
}

#[cfg(feature = "cli")]
fn converter(
    loader: &Loader,
    capabilities: &Path,
) -> CliResult<PrintTicketConverter<InProcessProvider>> {
    let caps = read(loader, capabilities)?;
    let provider = InProcessProvider::with_limits("printschema", caps, loader.limits().clone())?;
    Ok(PrintTicketConverter::new("printschema", 1, provider)?)
}

#[cfg(feature = "cli")]
fn cmd_caps(loader: &Loader, path: &Path, json_output: bool) -> CliResult {
    use serde_json::{json, Map, Value};

    let caps = PrintCapabilities::parse_with_limits(&read(loader, path)?, loader.limits())?;

    if json_output {
        let mut output = Map::new();
        let mut features = Map::new();
        for feature in caps.features() {
            features.insert(
                feature.keyword().to_string(),
                json!(feature.option_names()),
            );
        }
        output.insert("features".to_string(), Value::Object(features));

        let parameters: Vec<Value> = ParameterName::ALL
            .iter()
            .filter_map(|name| caps.parameter(*name))
            .map(|def| {
                json!({
                    "name": def.name.keyword(),
                    "default": def.default_value,
                    "min": def.min_value,
                    "max": def.max_value,
                    "multiple": def.multiple,
                    "unit": def.unit_type,
                })
            })
            .collect();
        output.insert("parameters".to_string(), Value::Array(parameters));
        println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
        return Ok(());
    }

    println!("printschema v{}", printschema::VERSION);
    println!();
    println!("=== Features ===");
    for feature in caps.features() {
        println!("  {} ({} options)", feature.keyword(), feature.option_count());
        for name in feature.option_names() {
            println!("    {}", name);
        }
    }
    println!();
    println!("=== Parameters ===");
    for def in ParameterName::ALL.iter().filter_map(|name| caps.parameter(*name)) {
        let bound = |v: Option<i32>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        println!(
            "  {} [{}, {}] default {}",
            def.name,
            bound(def.min_value),
            bound(def.max_value),
            bound(def.default_value)
        );
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_ticket(loader: &Loader, path: &Path, json_output: bool) -> CliResult {
    use serde_json::{json, Map, Value};

    let ticket = load_ticket(loader, path)?;
    let known = |v: i32| if v == UNSPECIFIED_INT { None } else { Some(v) };
    let keyword = |v: Option<&'static str>| v.map(str::to_string);

    let media = ticket.media_size();
    let resolution = ticket.resolution();
    let mut output = Map::new();
    output.insert("features".to_string(), json!(ticket.feature_keywords()));
    output.insert("duplex".to_string(), json!(keyword(ticket.duplex().value().map(|v| v.keyword()))));
    output.insert("collate".to_string(), json!(keyword(ticket.collate().value().map(|v| v.keyword()))));
    output.insert(
        "orientation".to_string(),
        json!(keyword(ticket.orientation().value().map(|v| v.keyword()))),
    );
    output.insert(
        "outputColor".to_string(),
        json!(keyword(ticket.output_color().value().map(|v| v.keyword()))),
    );
    output.insert(
        "mediaSize".to_string(),
        json!({
            "name": keyword(media.value().map(|v| v.keyword())),
            "width": known(media.width()),
            "height": known(media.height()),
        }),
    );
    output.insert(
        "resolution".to_string(),
        json!({
            "x": known(resolution.x()),
            "y": known(resolution.y()),
            "qualitative": keyword(resolution.qualitative().map(|v| v.keyword())),
        }),
    );
    output.insert("pagesPerSheet".to_string(), json!(known(ticket.nup().pages_per_sheet())));
    output.insert("copies".to_string(), json!(known(ticket.copies().value())));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    } else {
        println!("printschema v{}", printschema::VERSION);
        println!();
        for (key, value) in &output {
            if !value.is_null() {
                println!("  {}: {}", key, value);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_check(loader: &Loader, path: &Path) -> CliResult {
    let ticket = load_ticket(loader, path)?;
    println!(
        "✓ {} is a well-formed PrintTicket ({} root settings)",
        path.display(),
        ticket.feature_keywords().len()
    );
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_set(
    loader: &Loader,
    path: &Path,
    duplex: Option<String>,
    copies: Option<i32>,
    orientation: Option<String>,
    media_size: Option<String>,
    output: Option<PathBuf>,
) -> CliResult {
    let ticket = load_ticket(loader, path)?;

    if let Some(duplex) = duplex {
        ticket
            .duplex()
            .set_value(parse_keyword::<Duplexing>("duplex", &duplex)?)?;
    }
    if let Some(copies) = copies {
        ticket.copies().set_value(copies)?;
    }
    if let Some(orientation) = orientation {
        ticket
            .orientation()
            .set_value(parse_keyword::<PageOrientation>("orientation", &orientation)?)?;
    }
    if let Some(media_size) = media_size {
        ticket
            .media_size()
            .set_fixed(parse_keyword::<PageMediaSizeName>("media size", &media_size)?)?;
    }

    write_output(output, &ticket.to_bytes()?)
}

#[cfg(feature = "cli")]
fn cmd_merge(
    loader: &Loader,
    base: &Path,
    delta: Option<&Path>,
    capabilities: &Path,
    scope: &str,
    output: Option<PathBuf>,
) -> CliResult {
    let scope = parse_scope(scope)?;
    let base = read(loader, base)?;
    let delta = delta.map(|path| read(loader, path)).transpose()?;

    let mut converter = converter(loader, capabilities)?;
    let (merged, status) = converter.merge_and_validate(&base, delta.as_deref(), Some(scope))?;
    converter.release()?;

    if status == ConflictStatus::ConflictResolved {
        eprintln!("Conflicts were resolved against the capabilities");
    }
    write_output(output, &merged)
}

#[cfg(feature = "cli")]
fn cmd_devmode(
    loader: &Loader,
    ticket: &Path,
    capabilities: &Path,
    printer_default: bool,
    output: &Path,
) -> CliResult {
    let ticket = read(loader, ticket)?;
    let base = if printer_default {
        BaseDevModeType::PrinterDefault
    } else {
        BaseDevModeType::UserDefault
    };

    let mut converter = converter(loader, capabilities)?;
    let devmode = converter.convert_ticket_to_devmode(&ticket, base, None)?;
    converter.release()?;

    fs::write(output, &devmode)?;
    eprintln!("Written {} bytes to {}", devmode.len(), output.display());
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_from_devmode(
    loader: &Loader,
    devmode: &Path,
    capabilities: &Path,
    output: Option<PathBuf>,
) -> CliResult {
    let devmode = fs::read(devmode)?;

    let mut converter = converter(loader, capabilities)?;
    let ticket = converter.convert_devmode_to_ticket(&devmode, None)?;
    converter.release()?;

    write_output(output, &ticket)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    std::process::exit(1);
}
