use catalog_view::client::{ArchiveClient, UreqTransport};
use catalog_view::config::{self, DEFAULT_CONFIG_FILE};
use catalog_view::export::ExportOptions;
use catalog_view::output;
use catalog_view::session::ArchiveSession;
use catalog_view::types::{self, Separator};
use catalog_view::view::CopyFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Filter flags shared by commands that act on the visible records.
#[derive(clap::Args, Clone, Debug)]
struct FilterArgs {
    /// Catalog (template) to show
    #[arg(long, short = 't')]
    template: Option<String>,

    /// Article within the catalog
    #[arg(long, short = 'a', requires = "template")]
    article: Option<String>,

    /// Show every image regardless of catalog
    #[arg(long, conflicts_with_all = ["template", "article"])]
    all: bool,
}

#[derive(Parser)]
#[command(name = "catalog-view")]
#[command(about = "Browse, filter and export an uploaded-image archive")]
#[command(long_about = "\
Browse, filter and export an uploaded-image archive

The archive is a JSON array of records, one per uploaded image:

  [{\"template\": \"Summer\", \"article\": \"4296278785\",
    \"url\": \"http://host/images/Summer/4296278785/4296278785_2_ffe8e5.jpg\",
    \"filename\": \"4296278785_2_ffe8e5.jpg\",
    \"thumbnail_url\": \"http://host/.../4296278785_2_ffe8e5_thumb.jpg\"}]

Ordering:
  Templates:  first-seen order in the archive
  Articles:   alphabetical within a template
  Images:     by the sequence number in the filename (<name>_<seq>_<hash>.<ext>)

Run 'catalog-view gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Archive records (JSON array)
    #[arg(long, default_value = "image_data.json", global = true)]
    data: PathBuf,

    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List catalogs in arrival order
    Templates,
    /// List the articles of a catalog
    Articles {
        /// Catalog name
        template: String,
    },
    /// Show the images for a selection
    Show(FilterArgs),
    /// Print all visible URLs for pasting elsewhere
    Copy {
        #[command(flatten)]
        filter: FilterArgs,
        /// One URL per line instead of comma-separated
        #[arg(long)]
        list: bool,
    },
    /// Generate a spreadsheet for the visible images
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Server-side document template
        #[arg(long)]
        document: String,
        /// How in-cell layouts join URLs: comma or newline
        #[arg(long)]
        separator: Option<Separator>,
        /// Print the request body instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete an image from the archive server
    Delete {
        /// Full URL of the image
        url: String,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_view=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Templates => output::print_templates(open_session(&cli.data)?.index()),
        Command::Articles { template } => {
            output::print_articles(open_session(&cli.data)?.index(), &template)
        }
        Command::Show(filter) => {
            let mut session = open_session(&cli.data)?;
            apply_filter(&mut session, &filter);
            output::print_visible(session.visible());
        }
        Command::Copy { filter, list } => {
            let mut session = open_session(&cli.data)?;
            apply_filter(&mut session, &filter);
            let format = if list {
                CopyFormat::List
            } else {
                CopyFormat::Inline
            };
            println!("{}", session.copy_text(format)?);
        }
        Command::Export {
            filter,
            document,
            separator,
            dry_run,
        } => {
            let config = config::load_config(&cli.config)?;
            let mut session = open_session(&cli.data)?;
            apply_filter(&mut session, &filter);
            let options = ExportOptions::for_document(
                &config.export.templates,
                &document,
                separator.unwrap_or(config.export.default_separator),
            )?;
            if dry_run {
                let payload = session.prepare_export(&options)?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                let client = ArchiveClient::new(UreqTransport::default(), &config.server);
                let outcome = session.export(
                    &client,
                    &options,
                    &config.downloads.dir,
                    chrono::Utc::now(),
                )?;
                output::print_export(&outcome);
            }
        }
        Command::Delete { url } => {
            let config = config::load_config(&cli.config)?;
            let mut session = open_session(&cli.data)?;
            let client = ArchiveClient::new(UreqTransport::default(), &config.server);
            session.delete(&client, &url)?;
            output::print_delete(&url, session.index().len());
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

fn open_session(data: &Path) -> Result<ArchiveSession, Box<dyn std::error::Error>> {
    let feed = std::fs::read_to_string(data)?;
    Ok(ArchiveSession::new(types::parse_feed(&feed)?))
}

/// Replay the selector events a user would make for these flags.
fn apply_filter(session: &mut ArchiveSession, filter: &FilterArgs) {
    if filter.all {
        session.show_all();
        return;
    }
    if let Some(template) = &filter.template {
        session.select_template(template);
        if let Some(article) = &filter.article {
            session.select_article(article);
        }
    }
}
