use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "catalog-updater",
    version,
    about = "Update store products from a CSV file, or export product ids to one"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Update products from a CSV file
    Update(UpdateArgs),

    /// Render one structured description to HTML
    Render(RenderArgs),

    /// Export every product and variant id to a CSV file
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// CSV file to read (overrides CSV_FILE)
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Log the payloads instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// File holding the raw description; reads stdin when omitted
    pub path: Option<PathBuf>,

    /// Print `{"html": ..., "warnings": [...]}` instead of bare HTML
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// CSV file to write
    #[arg(long, short, default_value = "shopify_products_export.csv")]
    pub output: PathBuf,

    /// Also look up inventory location ids (one extra request per product)
    #[arg(long)]
    pub locations: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_args() {
        let cli = Cli::try_parse_from(["catalog-updater", "update", "--csv", "rows.csv", "--dry-run"])
            .unwrap();
        match cli.command {
            Commands::Update(args) => {
                assert_eq!(args.csv, Some(PathBuf::from("rows.csv")));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_render_args_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["catalog-updater", "render", "--json"]).unwrap();
        match cli.command {
            Commands::Render(args) => {
                assert!(args.path.is_none());
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_export_args() {
        let cli = Cli::try_parse_from(["catalog-updater", "export"]).unwrap();
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.output, PathBuf::from("shopify_products_export.csv"));
                assert!(!args.locations);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli =
            Cli::try_parse_from(["catalog-updater", "export", "-o", "ids.csv", "--locations"]).unwrap();
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.output, PathBuf::from("ids.csv"));
                assert!(args.locations);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["catalog-updater"]).is_err());
    }
}
