use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use viewer_core::ImageFormat;

#[derive(Parser, Debug)]
#[command(name = "gis-viewer", version, about = "Look up AIESEC GIS records and export them as cards")]
pub struct Cli {
    #[arg(long, global = true, help = "RON configuration file (default: ./gis_viewer.ron if present)")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Log at debug level")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show an opportunity by id.
    Opportunity {
        id: String,
        #[command(flatten)]
        actions: CardActions,
    },
    /// Show a post for a topic.
    Post {
        topic: String,
        #[command(flatten)]
        actions: CardActions,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct CardActions {
    #[arg(long, help = "Print the card as clipboard text")]
    pub copy: bool,
    #[arg(long, value_enum, help = "Save the card as an image")]
    pub export: Option<ExportFormat>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
}

impl From<ExportFormat> for ImageFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpg => ImageFormat::Jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_opportunity_with_actions() {
        let cli = Cli::try_parse_from([
            "gis-viewer",
            "-v",
            "opportunity",
            "12345",
            "--copy",
            "--export",
            "jpg",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Opportunity { id, actions } => {
                assert_eq!(id, "12345");
                assert!(actions.copy);
                assert_eq!(actions.export, Some(ExportFormat::Jpg));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_export_format() {
        assert!(Cli::try_parse_from(["gis-viewer", "post", "x", "--export", "gif"]).is_err());
    }
}
