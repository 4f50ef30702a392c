mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tailcast_core::config::AppConfig;

#[derive(Parser)]
#[command(name = "tailcast")]
#[command(about = "Figma and screenshot to React + Tailwind, with a local preview")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the Figma proxy
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show or change the saved generation settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Generate a React component
    Convert {
        #[command(subcommand)]
        input: ConvertInput,
        /// Write the code here instead of stdout
        #[arg(long, global = true)]
        out: Option<PathBuf>,
    },

    /// Render generated code and write a standalone preview document
    Preview {
        /// File holding the generated code
        path: PathBuf,
        /// HTML output path (defaults to the input with an .html extension)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the saved settings (the API key is masked)
    Show,
    /// Save the given values; omitted ones are kept
    Set {
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConvertInput {
    /// From a Figma file key or URL, through the proxy
    Figma { key_or_url: String },
    /// From a UI screenshot
    Image { path: PathBuf },
    /// From a CSS snippet, optionally with a reference image
    Css {
        path: PathBuf,
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init(&AppConfig::log_dir());

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Serve { host, port } => commands::serve(config, host, port).await,
        Command::Settings { action } => match action {
            SettingsAction::Show => commands::settings_show(config).await,
            SettingsAction::Set { api_key, model } => {
                commands::settings_set(config, api_key, model).await
            }
        },
        Command::Convert { input, out } => {
            let job = match input {
                ConvertInput::Figma { key_or_url } => commands::ConvertJob::Figma(key_or_url),
                ConvertInput::Image { path } => commands::ConvertJob::Image(path),
                ConvertInput::Css { path, image } => commands::ConvertJob::Css { path, image },
            };
            commands::convert(config, job, out).await
        }
        Command::Preview { path, out } => commands::preview(&path, out).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert_css_with_image() {
        let cli = Cli::try_parse_from([
            "tailcast", "convert", "css", "card.css", "--image", "card.png", "--out", "Card.jsx",
        ])
        .unwrap();
        let Command::Convert { input, out } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(out, Some(PathBuf::from("Card.jsx")));
        assert!(matches!(
            input,
            ConvertInput::Css { path, image: Some(image) }
                if path == PathBuf::from("card.css") && image == PathBuf::from("card.png")
        ));
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["tailcast", "serve", "--port", "4100"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Serve { host: None, port: Some(4100) }
        ));
    }

    #[test]
    fn test_settings_requires_action() {
        assert!(Cli::try_parse_from(["tailcast", "settings"]).is_err());
    }
}
