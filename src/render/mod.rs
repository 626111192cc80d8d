//! Template lookup and text rendering.

mod seeds;

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tera::{Context, Tera, Value};
use tracing::{debug, info};

use crate::context::build_context;
use crate::error::ConfigError;
use crate::models::{vendor, DeviceConfig};
use crate::utils::{config_filename, subnet_mask};

/// The one section every template set provides.
pub const FULL_CONFIG: &str = "full_config";

/// Template set key: `{vendor}/{firmware}/{section}`.
pub fn template_key(vendor_name: &str, firmware: &str, section: &str) -> String {
    format!("{}/{}/{}", vendor_name, firmware, section)
}

/// Source of template text
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn has_template(&self, path: &str) -> bool;

    /// Fetch template source. Missing keys fail with `TemplateNotFound`.
    async fn get_template(&self, path: &str) -> Result<String, ConfigError>;

    /// Supported `vendor/firmware` pairs, sorted.
    async fn vendors(&self) -> Vec<String>;
}

fn vendor_pairs<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    keys.filter_map(|key| {
        let mut parts = key.split('/');
        match (parts.next(), parts.next()) {
            (Some(v), Some(f)) => Some(format!("{}/{}", v, f)),
            _ => None,
        }
    })
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Templates compiled into the binary
#[derive(Debug, Clone)]
pub struct BundledTemplates {
    templates: HashMap<String, String>,
}

impl BundledTemplates {
    pub fn new() -> Self {
        let templates = seeds::BUNDLED
            .iter()
            .map(|(key, source)| (key.to_string(), source.to_string()))
            .collect();
        Self { templates }
    }

    /// Add or replace a template.
    pub fn with_template(mut self, key: &str, source: &str) -> Self {
        self.templates.insert(key.to_string(), source.to_string());
        self
    }
}

impl Default for BundledTemplates {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateStore for BundledTemplates {
    async fn has_template(&self, path: &str) -> bool {
        self.templates.contains_key(path)
    }

    async fn get_template(&self, path: &str) -> Result<String, ConfigError> {
        match self.templates.get(path) {
            Some(source) => Ok(source.clone()),
            None => Err(ConfigError::TemplateNotFound {
                path: path.to_string(),
                supported: self.vendors().await,
            }),
        }
    }

    async fn vendors(&self) -> Vec<String> {
        vendor_pairs(self.templates.keys().map(String::as_str))
    }
}

/// Templates on disk at `{root}/{vendor}/{firmware}/{section}.tera`
#[derive(Debug, Clone)]
pub struct DirTemplates {
    root: PathBuf,
}

impl DirTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File behind a template key. Keys are `/`-joined plain identifiers;
    /// anything else could leave `root` and has no file.
    fn file_for(&self, path: &str) -> Option<PathBuf> {
        let plain = path.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        });
        plain.then(|| self.root.join(format!("{}.tera", path)))
    }

    async fn subdirs(dir: PathBuf) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            return names;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

#[async_trait]
impl TemplateStore for DirTemplates {
    async fn has_template(&self, path: &str) -> bool {
        let Some(file) = self.file_for(path) else {
            return false;
        };
        tokio::fs::metadata(file)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn get_template(&self, path: &str) -> Result<String, ConfigError> {
        let Some(file) = self.file_for(path) else {
            return Err(ConfigError::TemplateNotFound {
                path: path.to_string(),
                supported: self.vendors().await,
            });
        };
        match tokio::fs::read_to_string(&file).await {
            Ok(source) => Ok(source),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::TemplateNotFound {
                path: path.to_string(),
                supported: self.vendors().await,
            }),
            Err(source) => Err(ConfigError::TemplateIo {
                path: file.display().to_string(),
                source,
            }),
        }
    }

    async fn vendors(&self) -> Vec<String> {
        let mut pairs = Vec::new();
        for vendor_name in Self::subdirs(self.root.clone()).await {
            for firmware in Self::subdirs(self.root.join(&vendor_name)).await {
                pairs.push(format!("{}/{}", vendor_name, firmware));
            }
        }
        pairs.sort();
        pairs
    }
}

/// Rendered text of one device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedConfig {
    pub hostname: String,
    pub filename: String,
    pub template: String,
    pub text: String,
}

/// Tera filter: prefix length to dotted netmask (`24 | subnet_mask`).
fn subnet_mask_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let len = value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|n| *n <= 32)
        .ok_or_else(|| tera::Error::msg(format!("subnet_mask: invalid prefix length {}", value)))?;
    Ok(Value::String(subnet_mask(len as u8).to_string()))
}

/// Tera filter: `start | parse_interface_range(end=...)` gives `start-end`.
fn parse_interface_range_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let start = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("parse_interface_range: start must be a string"))?;
    let end = args
        .get("end")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("parse_interface_range: missing end"))?;
    Ok(Value::String(format!("{}-{}", start, end)))
}

/// Tera keeps the underlying cause in the source chain; surface all of it.
fn tera_message(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Binds device configs to templates from a store
#[derive(Clone)]
pub struct Renderer {
    store: Arc<dyn TemplateStore>,
    blank_lines: Option<Regex>,
}

impl Renderer {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self {
            store,
            blank_lines: Regex::new(r"\n(?:[ \t]*\n){3,}").ok(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    /// Collapse three or more consecutive blank lines into one.
    pub fn collapse_blank_lines(&self, text: &str) -> String {
        match &self.blank_lines {
            Some(re) => re.replace_all(text, "\n\n").into_owned(),
            None => text.to_string(),
        }
    }

    /// Render the full configuration of one device.
    ///
    /// Reads exactly one template from the store. Firmware comes from the
    /// vendor table, never from the document.
    pub async fn render(&self, config: &DeviceConfig) -> Result<RenderedConfig, ConfigError> {
        let vendor_name = config.switch.vendor.trim().to_lowercase();
        let firmware = vendor::firmware_for(&vendor_name);
        let key = template_key(&vendor_name, &firmware, FULL_CONFIG);
        let hostname = config.switch.hostname.clone();

        let source = self.store.get_template(&key).await?;
        debug!(template = %key, hostname = %hostname, "Loaded template");

        let mut tera = Tera::default();
        tera.register_filter("subnet_mask", subnet_mask_filter);
        tera.register_filter("parse_interface_range", parse_interface_range_filter);
        tera.add_raw_template(&key, &source)
            .map_err(|e| ConfigError::InvalidTemplate {
                path: key.clone(),
                message: tera_message(&e),
            })?;

        let context = Context::from_serialize(build_context(config)).map_err(|e| ConfigError::Render {
            hostname: hostname.clone(),
            message: tera_message(&e),
        })?;
        let text = tera.render(&key, &context).map_err(|e| ConfigError::Render {
            hostname: hostname.clone(),
            message: tera_message(&e),
        })?;

        info!(hostname = %hostname, template = %key, "Rendered config");
        Ok(RenderedConfig {
            filename: config_filename(&hostname),
            hostname,
            template: key,
            text: self.collapse_blank_lines(&text),
        })
    }
}
