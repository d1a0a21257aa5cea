use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use cloud_pricing_finder::helpers::{download, filter_from_terms};
use cloud_pricing_finder::logging::init_logging;
use cloud_pricing_finder::{IndexDocument, IndexFormat, ProductQuery, ProductRecord, Selector, Settings};

const SETTINGS_ENV: &str = "CLOUD_PRICING_SETTINGS";

#[derive(Parser, Debug)]
#[command(name = "cloud-pricing-finder", version, about = "Find SKUs in a cloud pricing catalog by attribute")]
struct Cli {
    /// JSON settings file (defaults to $CLOUD_PRICING_SETTINGS, then resources/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the pricing endpoint base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Override the request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List product names found in the offer index
    Services,
    /// List the current catalog URL of every product
    Urls,
    /// Print the offer index
    Index {
        /// Print the body exactly as served instead of re-formatted JSON
        #[arg(long)]
        raw: bool,
    },
    /// Save the offer index to a local file
    DownloadIndex {
        /// Destination file (defaults to the index file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Find the SKUs of one catalog whose attributes match every filter
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// attribute=pattern, repeatable; `*` and `?` are wildcards, `\` escapes
    #[arg(short, long = "filter", value_name = "ATTRIBUTE=PATTERN")]
    filters: Vec<String>,

    /// Print matches as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Product name from the offer index, eg. AmazonRDS
    #[arg(long)]
    product: Option<String>,
    /// Catalog URL
    #[arg(long)]
    url: Option<String>,
    /// Pre-downloaded catalog file
    #[arg(long)]
    path: Option<PathBuf>,
}

impl SourceArgs {
    fn selector(self) -> Result<Selector> {
        match (self.product, self.url, self.path) {
            (Some(name), _, _) => Ok(Selector::ProductName(name)),
            (_, Some(url), _) => Ok(Selector::Url(url)),
            (_, _, Some(path)) => Ok(Selector::Path(path)),
            (None, None, None) => bail!("one of --product, --url or --path is required"),
        }
    }
}

fn construct_settings_file_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources").join("settings.json")
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = if let Some(path) = &cli.config {
        Settings::from_file(path).with_context(|| format!("load settings from {}", path.display()))?
    } else if std::env::var_os(SETTINGS_ENV).is_some() {
        Settings::from_env(SETTINGS_ENV).with_context(|| format!("load settings from ${SETTINGS_ENV}"))?
    } else {
        let bundled = construct_settings_file_path();
        if bundled.exists() {
            Settings::from_file(&bundled).with_context(|| format!("load settings from {}", bundled.display()))?
        } else {
            Settings::default()
        }
    };

    let settings = match &cli.base_url {
        Some(base_url) => settings.with_base_url(base_url.clone()),
        None => settings,
    };
    let settings = match cli.timeout {
        Some(secs) => settings.with_timeout_secs(secs),
        None => settings,
    };

    settings.validate()?;
    debug!(?settings, "effective settings");
    Ok(settings)
}

/// Render one match for the terminal.
fn print_record(record: &ProductRecord) {
    println!("{}  ({})", record.sku(), record.product_family());
    for (name, value) in record.attributes() {
        println!("  {name}: {value}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(&cli)?;
    let query = ProductQuery::new(settings.clone())?;

    match cli.command {
        Command::Services => {
            for name in query.list_services().await? {
                println!("{name}");
            }
        }
        Command::Urls => {
            for url in query.list_catalog_urls().await? {
                println!("{url}");
            }
        }
        Command::Index { raw } => {
            let format = if raw { IndexFormat::Raw } else { IndexFormat::Structured };
            match query.fetch_index(format).await? {
                IndexDocument::Raw(text) => println!("{text}"),
                IndexDocument::Structured(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
            }
        }
        Command::DownloadIndex { output, quiet } => {
            let url = settings.index_url()?;
            let dest = match output {
                Some(path) => path,
                None => std::env::current_dir()
                    .context("resolve current dir")?
                    .join(download::default_file_name(&url)),
            };
            download::download_to(&settings, &url, &dest, !quiet).await?;
        }
        Command::Query(args) => {
            let filter = filter_from_terms(&args.filters)?;
            let selector = args.source.selector()?;

            let records = query
                .query_products(&selector, &filter)
                .await
                .with_context(|| format!("query {selector}"))?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                eprintln!("No products in {selector} match the given filters");
            } else {
                for record in &records {
                    print_record(record);
                }
                eprintln!("{} matching product(s)", records.len());
            }
        }
    }

    Ok(())
}
