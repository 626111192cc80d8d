use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::render::{BundledTemplates, DirTemplates, Renderer, TemplateStore};
use crate::services::generation::{prepare_device, write_pair_artifacts, GenerationService};

#[derive(Debug, Parser)]
#[command(name = "torforge")]
#[command(about = "Top-of-rack pair switch configuration generator", long_about = None)]
pub struct Cli {
    /// Template directory (`{vendor}/{firmware}/{section}.tera`); bundled templates when unset
    #[arg(long, global = true, env = "TEMPLATES_DIR")]
    pub templates_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "LISTEN_ADDR")]
        listen: Option<String>,
    },
    /// Validate a device document
    Validate { file: PathBuf },
    /// Validate a device document and print it with the role-derived values
    Transform { file: PathBuf },
    /// Render a device document to `{hostname}.cfg`
    Render {
        file: PathBuf,
        #[arg(short, long, env = "OUTPUT_DIR")]
        output: Option<PathBuf>,
    },
    /// Build both TORs (and the BMC switch when requested) from a pair request
    /// and write their JSON and rendered text
    Generate {
        file: PathBuf,
        #[arg(short, long, env = "OUTPUT_DIR")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Flags win over the environment-derived config.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(dir) = &self.templates_dir {
            cfg.templates_dir = dir.clone();
        }
        if let Some(Command::Serve { listen: Some(addr) }) = &self.command {
            cfg.listen_addr = addr.clone();
        }
    }
}

pub fn template_store(cfg: &Config) -> Arc<dyn TemplateStore> {
    if cfg.templates_dir.is_empty() {
        Arc::new(BundledTemplates::new())
    } else {
        Arc::new(DirTemplates::new(&cfg.templates_dir))
    }
}

pub fn generator(cfg: &Config) -> GenerationService {
    GenerationService::new(Renderer::new(template_store(cfg)))
}

async fn load_document(path: &Path) -> anyhow::Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn output_dir(flag: Option<PathBuf>, cfg: &Config) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(&cfg.output_dir))
}

/// Run a one-shot command. `Serve` is handled by `main`.
pub async fn run(command: Command, cfg: &Config) -> anyhow::Result<()> {
    let generator = generator(cfg);
    match command {
        Command::Serve { .. } => bail!("serve is not a one-shot command"),
        Command::Validate { file } => {
            let prepared = prepare_device(load_document(&file).await?);
            for w in &prepared.warnings {
                println!("warning: {}: '{}' -> '{}' ({})", w.path, w.original, w.normalized, w.message);
            }
            println!("{}", prepared.validation);
            if !prepared.validation.valid {
                bail!("{} validation error(s)", prepared.validation.errors.len());
            }
        }
        Command::Transform { file } => {
            let prepared = prepare_device(load_document(&file).await?);
            match prepared.valid_config() {
                Some(config) => println!("{}", serde_json::to_string_pretty(config)?),
                None => bail!("validation failed:\n{}", prepared.validation),
            }
        }
        Command::Render { file, output } => {
            let dir = output_dir(output, cfg);
            let path = render_to(&generator, load_document(&file).await?, &dir).await?;
            println!("{}", path.display());
        }
        Command::Generate { file, output } => {
            let dir = output_dir(output, cfg);
            let report = generator.generate_pair(load_document(&file).await?).await?;
            if !report.validation.valid {
                bail!("validation failed:\n{}", report.validation);
            }
            for path in write_pair_artifacts(&report, &dir).await? {
                println!("{}", path.display());
            }
            for device in report.devices() {
                if let Some(err) = &device.render_error {
                    eprintln!("{}: {}", device.hostname, err);
                }
            }
            if let Some(bundle) = &report.bundle_name {
                println!("bundle: {}", bundle);
            }
            if !report.success {
                bail!("rendering failed for at least one device");
            }
        }
    }
    Ok(())
}

async fn render_to(generator: &GenerationService, document: Value, dir: &Path) -> anyhow::Result<PathBuf> {
    let response = generator.generate_device(document).await;
    let (Some(text), Some(filename)) = (response.config, response.filename) else {
        let mut message = response.error.unwrap_or_else(|| "generation failed".to_string());
        for e in response.validation_errors.unwrap_or_default() {
            message.push_str(&format!("\n  {}", e));
        }
        bail!(message);
    };
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, text)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::tests::rack1_pair;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["torforge", "--templates-dir", "/srv/templates", "serve", "--listen", "127.0.0.1:9000"]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.templates_dir, "/srv/templates");
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::parse_from(["torforge"]);
        assert!(cli.command.is_none());
    }

    #[tokio::test]
    async fn test_render_writes_hostname_cfg() {
        let (tor1, _) = rack1_pair();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tor1.json");
        std::fs::write(&input, serde_json::to_string(&tor1).unwrap()).unwrap();

        let out = dir.path().join("out");
        run(Command::Render { file: input, output: Some(out.clone()) }, &Config::default())
            .await
            .unwrap();
        let text = std::fs::read_to_string(out.join("rack1-tor1.cfg")).unwrap();
        assert!(text.contains("hostname rack1-tor1"));
    }

    #[tokio::test]
    async fn test_validate_fails_on_bad_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.json");
        std::fs::write(&input, r#"{"vlans": []}"#).unwrap();
        let err = run(Command::Validate { file: input }, &Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("validation error"));
    }

    #[tokio::test]
    async fn test_missing_file_has_context() {
        let err = run(Command::Transform { file: PathBuf::from("/nonexistent/doc.json") }, &Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
