use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use stickerlab_contracts::catalog::{
    find_print_size, AspectRatio, BrandId, ShapeId, StyleId, BRANDS, PRINT_SIZES, SHAPES, STYLES,
    TEMPLATES,
};
use stickerlab_contracts::events::EventWriter;
use stickerlab_contracts::records::{now_millis, GeneratedSticker};
use stickerlab_contracts::storage::FileStore;
use stickerlab_engine::export::{export_filename, export_sticker, ExportFormat};
use stickerlab_engine::packer::PageFormat;
use stickerlab_engine::{Action, StickerClient, StickerVault, Studio, StudioConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "stickerlab", version, about = "Brand sticker studio")]
struct Cli {
    /// Answer every model call offline with deterministic placeholders.
    #[arg(long, global = true)]
    dryrun: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a new sticker from a prompt.
    Generate(GenerateArgs),
    /// Refine the last result (or a history record) with an instruction.
    Edit(EditArgs),
    #[command(subcommand)]
    History(HistoryCommand),
    #[command(subcommand)]
    Library(LibraryCommand),
    #[command(subcommand)]
    Queue(QueueCommand),
    /// Lay the print queue out on A4/A3 pages as one PDF.
    PrintSheet(PrintSheetArgs),
    /// Export one history record as PNG, JPEG, PDF or SVG.
    Export(ExportArgs),
    /// List brands, styles, shapes, print sizes and prompt templates.
    Catalog,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long)]
    prompt: String,
    #[arg(long, value_parser = parse_brand)]
    brand: Option<BrandId>,
    #[arg(long, value_parser = parse_style)]
    style: Option<StyleId>,
    #[arg(long, value_parser = parse_shape)]
    shape: Option<ShapeId>,
    /// Print-size label, e.g. "Quadrat" or "Ultra Wide".
    #[arg(long)]
    size: Option<String>,
    #[arg(long, value_parser = parse_ratio)]
    ratio: Option<AspectRatio>,
    /// Template id to append to the prompt; repeatable.
    #[arg(long = "template")]
    templates: Vec<String>,
    /// Manual reference image.
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Library asset id to send as a reference; repeatable.
    #[arg(long = "asset")]
    assets: Vec<String>,
    /// Skip search-grounded prompt enhancement.
    #[arg(long)]
    no_search: bool,
    #[arg(long)]
    cut_line: bool,
    /// Also write the result as PNG into this directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct EditArgs {
    #[arg(long)]
    prompt: String,
    /// History record to edit instead of the last result.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    cut_line: bool,
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum LibraryCommand {
    Add {
        #[arg(long, value_parser = parse_brand)]
        brand: BrandId,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    List {
        #[arg(long, value_parser = parse_brand)]
        brand: Option<BrandId>,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum QueueCommand {
    Add { id: String },
    Remove { id: String },
    List,
}

#[derive(Debug, Args)]
struct PrintSheetArgs {
    #[arg(long, default_value = "a4", value_parser = parse_page_format)]
    format: PageFormat,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct ExportArgs {
    id: String,
    #[arg(long, default_value = "png", value_parser = parse_export_format)]
    format: ExportFormat,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("stickerlab error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();
    if matches!(cli.command, Command::Catalog) {
        print_catalog();
        return Ok(0);
    }

    let config = StudioConfig::from_env();
    let live = !cli.dryrun && needs_model(&cli.command);
    let mut studio = open_studio(&config, live)?;
    studio.restore_session();

    let code = match cli.command {
        Command::Generate(args) => run_generate(&mut studio, args)?,
        Command::Edit(args) => run_edit(&mut studio, args)?,
        Command::History(command) => run_history(&mut studio, command)?,
        Command::Library(command) => run_library(&mut studio, command)?,
        Command::Queue(command) => run_queue(&mut studio, command)?,
        Command::PrintSheet(args) => {
            let path = studio.write_print_sheet(args.format, &args.out)?;
            println!("{}", path.display());
            0
        }
        Command::Export(args) => run_export(&studio, args)?,
        Command::Catalog => 0,
    };
    studio.save_session()?;
    Ok(code)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Commands that never call a model run on the offline transport, so
/// housekeeping works without a credential.
fn needs_model(command: &Command) -> bool {
    matches!(command, Command::Generate(_) | Command::Edit(_))
}

fn open_studio(config: &StudioConfig, live: bool) -> Result<Studio<FileStore>> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    let store = FileStore::new(config.store_path()).with_capacity_bytes(config.storage_quota_bytes);
    let vault = StickerVault::open(store, config.history_limit, config.library_limit_per_brand);
    let client = StickerClient::from_config(config, !live)?;
    let events = EventWriter::new(config.events_path(), Uuid::new_v4().to_string());
    debug!(
        data_dir = %config.data_dir.display(),
        transport = client.transport_name(),
        session_id = events.session_id(),
        "studio opened"
    );
    Ok(Studio::new(client, vault).with_events(events))
}

fn run_generate(studio: &mut Studio<FileStore>, args: GenerateArgs) -> Result<i32> {
    if args.prompt.trim().is_empty() {
        bail!("--prompt must not be empty");
    }
    if let Some(brand) = args.brand {
        studio.dispatch(Action::SelectBrand(brand));
    }
    if let Some(size) = args.size.as_deref() {
        let Some(entry) = find_print_size(size) else {
            bail!("unknown print size: {size}");
        };
        studio.dispatch(Action::SelectSize(entry.label.to_string()));
    }
    if let Some(style) = args.style {
        studio.dispatch(Action::SelectStyle(style));
    }
    if let Some(shape) = args.shape {
        studio.dispatch(Action::SelectShape(shape));
    }
    if let Some(ratio) = args.ratio {
        studio.dispatch(Action::SetAspectRatio(ratio));
    }
    studio.dispatch(Action::SetPrompt(args.prompt));
    for template in args.templates {
        studio.dispatch(Action::AppendTemplate(template));
    }
    if args.no_search == studio.state().use_search {
        studio.dispatch(Action::ToggleWebGrounding);
    }
    if args.cut_line != studio.state().cut_line {
        studio.dispatch(Action::ToggleCutLine);
    }

    let brand = studio.state().brand_id;
    for id in args.assets {
        match studio.vault().find_asset(&id) {
            Some(asset) if asset.brand_id == brand => studio.dispatch(Action::ToggleAsset(id)),
            Some(_) => bail!("library asset {id} belongs to another brand"),
            None => bail!("unknown library asset: {id}"),
        }
    }
    if let Some(path) = args.reference.as_deref() {
        let bytes = read_file(path)?;
        studio.upload_reference(&bytes)?;
    }

    let previous = current_id(studio);
    studio.dispatch(Action::Generate);
    finish_generation(studio, previous, args.out.as_deref())
}

fn run_edit(studio: &mut Studio<FileStore>, args: EditArgs) -> Result<i32> {
    if args.prompt.trim().is_empty() {
        bail!("--prompt must not be empty");
    }
    if let Some(id) = args.id.as_deref() {
        let Some(record) = studio.vault().find_history(id).cloned() else {
            bail!("unknown history record: {id}");
        };
        studio.dispatch(Action::LoadHistory(record));
    }
    if studio.state().current.is_none() {
        bail!("nothing to edit; generate a sticker first or pass --id");
    }
    if args.cut_line != studio.state().cut_line {
        studio.dispatch(Action::ToggleCutLine);
    }
    let previous = current_id(studio);
    studio.dispatch(Action::SetEditPrompt(args.prompt));
    studio.dispatch(Action::Edit);
    finish_generation(studio, previous, args.out.as_deref())
}

fn current_id(studio: &Studio<FileStore>) -> Option<String> {
    studio.state().current.as_ref().map(|sticker| sticker.id.clone())
}

/// `previous` is the result shown before the dispatch; seeing it again means
/// nothing new was produced.
fn finish_generation(
    studio: &mut Studio<FileStore>,
    previous: Option<String>,
    out: Option<&Path>,
) -> Result<i32> {
    if let Some(error) = studio.state().error.clone() {
        eprintln!("generation failed: {error}");
        return Ok(1);
    }
    let Some(sticker) = studio.state().current.clone() else {
        bail!("generation produced no result");
    };
    if previous.as_deref() == Some(sticker.id.as_str()) {
        bail!("generation produced no new result");
    }
    println!("{}", sticker.id);
    if let Some(enhanced) = sticker.enhanced_prompt.as_deref() {
        if enhanced != sticker.prompt {
            println!("enhanced: {enhanced}");
        }
    }
    if let Some(dir) = out {
        let path = write_export(&sticker, ExportFormat::Png, dir)?;
        println!("{}", path.display());
    }
    Ok(0)
}

fn run_history(studio: &mut Studio<FileStore>, command: HistoryCommand) -> Result<i32> {
    match command {
        HistoryCommand::List => {
            for sticker in studio.vault().history() {
                let queued = if studio.state().in_print_queue(&sticker.id) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{queued} {}  {}  {:<10}  {}",
                    sticker.id,
                    format_timestamp(sticker.timestamp),
                    sticker.brand_id,
                    sticker.prompt
                );
            }
        }
        HistoryCommand::Show { id } => {
            let Some(sticker) = studio.vault().find_history(&id) else {
                bail!("unknown history record: {id}");
            };
            println!("{}", serde_json::to_string_pretty(&record_summary(sticker))?);
        }
        HistoryCommand::Delete { id } => {
            if studio.vault().find_history(&id).is_none() {
                bail!("unknown history record: {id}");
            }
            studio.dispatch(Action::DeleteHistory(id));
            report_notice(studio);
        }
    }
    Ok(0)
}

fn run_library(studio: &mut Studio<FileStore>, command: LibraryCommand) -> Result<i32> {
    match command {
        LibraryCommand::Add { brand, files } => {
            studio.dispatch(Action::SelectBrand(brand));
            for path in files {
                let bytes = read_file(&path)?;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                let asset = studio.upload_library_asset(&name, &bytes)?;
                println!("{}  {}", asset.id, asset.name);
            }
        }
        LibraryCommand::List { brand } => {
            for asset in studio.vault().library() {
                if brand.is_some_and(|brand| brand != asset.brand_id) {
                    continue;
                }
                println!(
                    "{}  {:<10}  {}  {}",
                    asset.id,
                    asset.brand_id,
                    format_timestamp(asset.timestamp),
                    asset.name
                );
            }
        }
        LibraryCommand::Delete { id } => {
            if studio.vault().find_asset(&id).is_none() {
                bail!("unknown library asset: {id}");
            }
            studio.dispatch(Action::DeleteAsset(id));
            report_notice(studio);
        }
    }
    Ok(0)
}

fn run_queue(studio: &mut Studio<FileStore>, command: QueueCommand) -> Result<i32> {
    match command {
        QueueCommand::Add { id } => {
            let Some(sticker) = studio.vault().find_history(&id).cloned() else {
                bail!("unknown history record: {id}");
            };
            if !studio.state().in_print_queue(&id) {
                studio.dispatch(Action::TogglePrintQueue(sticker));
            }
        }
        QueueCommand::Remove { id } => {
            let queued = studio
                .state()
                .print_queue
                .iter()
                .find(|sticker| sticker.id == id)
                .cloned();
            match queued {
                Some(sticker) => studio.dispatch(Action::TogglePrintQueue(sticker)),
                None => bail!("not in the print queue: {id}"),
            }
        }
        QueueCommand::List => {
            for sticker in &studio.state().print_queue {
                println!(
                    "{}  {:<12}  {}",
                    sticker.id,
                    sticker.size_label.as_deref().unwrap_or("-"),
                    sticker.prompt
                );
            }
        }
    }
    Ok(0)
}

fn run_export(studio: &Studio<FileStore>, args: ExportArgs) -> Result<i32> {
    let Some(sticker) = studio.vault().find_history(&args.id) else {
        bail!("unknown history record: {}", args.id);
    };
    let path = write_export(sticker, args.format, &args.out)?;
    println!("{}", path.display());
    Ok(0)
}

fn write_export(sticker: &GeneratedSticker, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let bytes = export_sticker(sticker, format)?;
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(export_filename(sticker, format, now_millis()));
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn print_catalog() {
    println!("Brands:");
    for brand in &BRANDS {
        println!("  {:<12} {} ({})", brand.id.as_str(), brand.name, brand.colors.join(", "));
    }
    println!("Styles:");
    for style in &STYLES {
        println!("  {:<20} {}", style.id.as_str(), style.name);
    }
    println!("Shapes:");
    for shape in &SHAPES {
        println!("  {:<12} {}", shape.id.as_str(), shape.name);
    }
    println!("Print sizes:");
    for size in &PRINT_SIZES {
        println!("  {:<14} {:<18} {}", size.label, size.dim, size.ratio);
    }
    println!("Templates:");
    for template in &TEMPLATES {
        println!("  {:<14} {}", template.id, template.label);
    }
}

fn report_notice(studio: &Studio<FileStore>) {
    if let Some(notice) = studio.state().notice.as_deref() {
        eprintln!("{notice}");
    }
}

/// Record metadata without the inline image payload.
fn record_summary(sticker: &GeneratedSticker) -> Value {
    json!({
        "id": sticker.id,
        "prompt": sticker.prompt,
        "enhancedPrompt": sticker.enhanced_prompt,
        "brandId": sticker.brand_id,
        "styleId": sticker.style_id,
        "shapeId": sticker.shape_id,
        "aspectRatio": sticker.aspect_ratio,
        "sizeLabel": sticker.size_label,
        "timestamp": sticker.timestamp,
        "imageBytes": sticker.image_url.len(),
    })
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|stamp| stamp.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_brand(raw: &str) -> Result<BrandId, String> {
    BrandId::parse(raw).ok_or_else(|| format!("unknown brand: {raw}"))
}

fn parse_style(raw: &str) -> Result<StyleId, String> {
    StyleId::parse(raw).ok_or_else(|| format!("unknown style: {raw}"))
}

fn parse_shape(raw: &str) -> Result<ShapeId, String> {
    ShapeId::parse(raw).ok_or_else(|| format!("unknown shape: {raw}"))
}

fn parse_ratio(raw: &str) -> Result<AspectRatio, String> {
    AspectRatio::parse(raw).ok_or_else(|| format!("unknown aspect ratio: {raw}"))
}

fn parse_page_format(raw: &str) -> Result<PageFormat, String> {
    PageFormat::parse(raw).ok_or_else(|| format!("page format must be a4 or a3, got {raw}"))
}

fn parse_export_format(raw: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(raw).ok_or_else(|| format!("unknown export format: {raw}"))
}
