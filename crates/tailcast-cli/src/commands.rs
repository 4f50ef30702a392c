use std::path::{Path, PathBuf};
use std::sync::Arc;

use tailcast_api::figma::FigmaClient;
use tailcast_api::image::{ImageError, ImagePart};
use tailcast_core::config::AppConfig;
use tailcast_core::error::TailcastError;
use tailcast_core::models::PersistedSettings;
use tailcast_jsx::{PreviewError, PreviewHost};
use tailcast_runtime::{Runtime, RuntimeError};
use tailcast_server::AppState;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] TailcastError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Preview(#[from] PreviewError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("nothing to save; pass --api-key or --model")]
    NothingToSave,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CliError + '_ {
    move |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ── serve ───────────────────────────────────────────────────────

pub async fn serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), CliError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if config.figma.token.is_none() {
        tracing::warn!("no Figma token configured; upstream requests will be rejected");
    }

    let addr = config.bind_addr();
    let listener = tailcast_server::bind(&addr).await.map_err(|source| CliError::Io {
        path: PathBuf::from(&addr),
        source,
    })?;
    let state = Arc::new(AppState::new(FigmaClient::from_config(&config.figma)));
    println!("Server running on http://{addr}");

    tailcast_server::serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
    .map_err(|source| CliError::Io {
        path: PathBuf::from(addr),
        source,
    })
}

// ── settings ────────────────────────────────────────────────────

pub async fn settings_show(config: AppConfig) -> Result<(), CliError> {
    let runtime = Runtime::new(config)?;
    let settings = runtime.get_settings().await?;
    println!(
        "api key: {}",
        settings.api_key().map(mask).unwrap_or_else(|| "(not set)".into())
    );
    println!("model:   {}", settings.model_or_default());
    Ok(())
}

pub async fn settings_set(
    config: AppConfig,
    api_key: Option<String>,
    model: Option<String>,
) -> Result<(), CliError> {
    if api_key.is_none() && model.is_none() {
        return Err(CliError::NothingToSave);
    }
    let runtime = Runtime::new(config)?;
    runtime
        .save_settings(PersistedSettings {
            api_key: api_key.map(|k| k.trim().to_string()),
            model_name: model.map(|m| m.trim().to_string()),
        })
        .await?;
    println!("Settings saved.");
    Ok(())
}

/// Keep the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

// ── convert ─────────────────────────────────────────────────────

pub enum ConvertJob {
    Figma(String),
    Image(PathBuf),
    Css { path: PathBuf, image: Option<PathBuf> },
}

pub async fn convert(
    config: AppConfig,
    job: ConvertJob,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let runtime = Runtime::new(config)?;

    let generation = match job {
        ConvertJob::Figma(key_or_url) => {
            let design = runtime.fetch_design(&key_or_url).await?;
            runtime.convert_figma(&design).await?
        }
        ConvertJob::Image(path) => {
            let image = ImagePart::from_path(&path).await?;
            runtime.convert_image(image).await?
        }
        ConvertJob::Css { path, image } => {
            let css = tokio::fs::read_to_string(&path)
                .await
                .map_err(io_error(&path))?;
            let image = match image {
                Some(image) => Some(ImagePart::from_path(&image).await?),
                None => None,
            };
            runtime.convert_css(&css, image).await?
        }
    };

    match out {
        Some(out) => {
            tokio::fs::write(&out, &generation.code)
                .await
                .map_err(io_error(&out))?;
            tracing::info!(path = %out.display(), "code written");
        }
        None => println!("{}", generation.code),
    }
    Ok(())
}

// ── preview ─────────────────────────────────────────────────────

/// Write the preview document even when rendering fails, so the error is
/// visible in the page too.
pub async fn preview(path: &Path, out: Option<PathBuf>) -> Result<(), CliError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(io_error(path))?;

    let mut host = PreviewHost::default();
    let outcome = host.run(&source);

    let out = out.unwrap_or_else(|| path.with_extension("html"));
    tokio::fs::write(&out, host.document())
        .await
        .map_err(io_error(&out))?;

    let size = outcome?;
    let (width, height) = size.ceil();
    let name = host.component().map(|c| c.name().to_string()).unwrap_or_default();
    println!("{name}: {width}x{height} -> {}", out.display());
    Ok(())
}
