use std::path::PathBuf;

use aideon_leads::aliases::{AliasTable, FieldProfile};
use aideon_leads::clean::{
    CleanPolicy, DEFAULT_CATEGORY_NAME, DEFAULT_LEAD_SOURCE, DEFAULT_USER_TYPE, LeadSourcePolicy,
    RecordCleaner,
};
use aideon_leads::config::DbConfig;
use aideon_leads::import::{self, DEFAULT_CHUNK_SIZE, FileOutcome, ImportOptions, ImportSummary};
use aideon_leads::io::{BadRowPolicy, ReadOptions};
use aideon_leads::model::CanonicalField;
use aideon_leads::resolve::ColumnResolver;
use aideon_leads::store::{DEFAULT_TABLE, MemoryStore, PostgresLoader, RecordSink, TargetTable};
use aideon_leads::{IngestError, Result, logging};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::Connection;
use tokio::runtime::Runtime;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing()?;

    match cli.command {
        Command::Load(args) => execute_load(args),
        Command::Clean(args) => execute_clean(args),
        Command::CheckDb => execute_check_db(),
    }
}

fn execute_load(args: LoadArgs) -> Result<()> {
    let cleaner = args.cleaning.build_cleaner()?;
    let options = args.cleaning.import_options()?;
    let target = TargetTable::parse(&args.table)?
        .with_salary(cleaner.resolver().aliases().recognises(CanonicalField::Salary));

    let runtime = runtime()?;
    let summary = if args.dry_run {
        let mut store = MemoryStore::new();
        runtime.block_on(load_all(&args, &cleaner, &options, &mut store))?
    } else {
        let config = DbConfig::from_env()?;
        runtime.block_on(load_into_database(&args, &cleaner, &options, &config, target))?
    };

    print_summary(&summary, args.dry_run);
    Ok(())
}

async fn load_into_database(
    args: &LoadArgs,
    cleaner: &RecordCleaner,
    options: &ImportOptions,
    config: &DbConfig,
    target: TargetTable,
) -> Result<ImportSummary> {
    let mut loader = PostgresLoader::connect(config, target).await?;
    let summary = load_all(args, cleaner, options, &mut loader).await?;
    loader.close().await?;
    Ok(summary)
}

async fn load_all<S>(
    args: &LoadArgs,
    cleaner: &RecordCleaner,
    options: &ImportOptions,
    sink: &mut S,
) -> Result<ImportSummary>
where
    S: RecordSink + ?Sized,
{
    if args.files.is_empty() {
        import::import_directory(&args.data_dir, cleaner, options, sink).await
    } else {
        import::import_sources(&args.files, cleaner, options, sink).await
    }
}

fn execute_clean(args: CleanArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(IngestError::MissingInput(args.input));
    }

    let cleaner = args.cleaning.build_cleaner()?;
    let options = args.cleaning.import_options()?;
    let stats = import::clean_file_to_json(&args.input, &args.output, &cleaner, &options)?;

    println!(
        "{}: {} rows read, {} cleaned, {} without phone, {} duplicates -> {}",
        args.input.display(),
        stats.rows_read,
        stats.cleaned,
        stats.rows_without_phone,
        stats.duplicates_removed,
        args.output.display()
    );
    Ok(())
}

fn execute_check_db() -> Result<()> {
    let config = DbConfig::from_env()?;
    let runtime = runtime()?;
    let version = runtime.block_on(async {
        let mut conn = sqlx::PgConnection::connect_with(&config.connect_options()).await?;
        let version: String = sqlx::query_scalar("SHOW server_version")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok::<_, IngestError>(version)
    })?;

    println!(
        "Connected successfully to {}:{}/{} (PostgreSQL {version})",
        config.host, config.port, config.database
    );
    Ok(())
}

fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

fn print_summary(summary: &ImportSummary, dry_run: bool) {
    for file in &summary.files {
        let status = match &file.outcome {
            FileOutcome::Loaded => "loaded".to_string(),
            FileOutcome::MissingPhoneColumn => "skipped (no phone column)".to_string(),
            FileOutcome::Failed(reason) => format!("failed ({reason})"),
        };
        println!(
            "{}: {status}; {} rows read, {} cleaned, {} inserted",
            file.path.display(),
            file.stats.rows_read,
            file.stats.cleaned,
            file.inserted
        );
    }

    let stats = summary.stats();
    println!(
        "{} file(s): {} rows read, {} cleaned, {} {}",
        summary.files.len(),
        stats.rows_read,
        stats.cleaned,
        summary.inserted(),
        if dry_run { "would be inserted" } else { "inserted" }
    );
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clean contact exports and load them into the users table."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean source files and merge them into the target table.
    Load(LoadArgs),
    /// Clean a single file and write the records as JSON.
    Clean(CleanArgs),
    /// Verify the database settings by opening a connection.
    CheckDb,
}

#[derive(clap::Args)]
struct LoadArgs {
    /// Files to import. When omitted every supported file in --data-dir is used.
    files: Vec<PathBuf>,

    /// Directory scanned for source files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Target table, optionally schema-qualified.
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Clean and deduplicate in memory without touching the database.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    cleaning: CleaningArgs,
}

#[derive(clap::Args)]
struct CleanArgs {
    /// Source file (CSV or spreadsheet).
    #[arg(long)]
    input: PathBuf,

    /// JSON file to write.
    #[arg(long)]
    output: PathBuf,

    #[command(flatten)]
    cleaning: CleaningArgs,
}

#[derive(clap::Args)]
struct CleaningArgs {
    /// Lead source stamped on every record.
    #[arg(long, default_value = DEFAULT_LEAD_SOURCE)]
    lead_source: String,

    /// Use each file's name (without extension) as its lead source.
    #[arg(long, conflicts_with = "lead_source")]
    lead_source_from_file: bool,

    /// User type stamped on every record.
    #[arg(long, default_value = DEFAULT_USER_TYPE)]
    user_type: String,

    /// Category name stamped on every record.
    #[arg(long = "category", default_value = DEFAULT_CATEGORY_NAME)]
    category_name: String,

    /// Also recognise salary and alternate phone columns.
    #[arg(long)]
    extended_fields: bool,

    /// JSON file replacing the built-in header spellings per field.
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Text encoding of CSV input.
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// What to do with rows that have more cells than the header.
    #[arg(long, value_enum, default_value_t = BadRowsKind::Warn)]
    on_bad_rows: BadRowsKind,

    /// Rows per database batch.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

impl CleaningArgs {
    fn build_cleaner(&self) -> Result<RecordCleaner> {
        let profile = if self.extended_fields {
            FieldProfile::Extended
        } else {
            FieldProfile::Standard
        };

        let mut aliases = AliasTable::for_profile(profile);
        if let Some(path) = &self.aliases {
            aliases = aliases.with_overrides(AliasTable::from_json_file(path)?);
        }

        let lead_source = if self.lead_source_from_file {
            LeadSourcePolicy::FileStem
        } else {
            LeadSourcePolicy::Fixed(self.lead_source.clone())
        };

        let policy = CleanPolicy {
            lead_source,
            user_type: self.user_type.clone(),
            category_name: self.category_name.clone(),
        };
        Ok(RecordCleaner::new(ColumnResolver::new(aliases), policy))
    }

    fn import_options(&self) -> Result<ImportOptions> {
        Ok(ImportOptions {
            read: ReadOptions::with_encoding_label(&self.encoding, self.on_bad_rows.into())?,
            chunk_size: self.chunk_size,
        })
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BadRowsKind {
    Skip,
    Warn,
    Error,
}

impl From<BadRowsKind> for BadRowPolicy {
    fn from(kind: BadRowsKind) -> Self {
        match kind {
            BadRowsKind::Skip => BadRowPolicy::Skip,
            BadRowsKind::Warn => BadRowPolicy::Warn,
            BadRowsKind::Error => BadRowPolicy::Error,
        }
    }
}
