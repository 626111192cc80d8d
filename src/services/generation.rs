use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::models::{DeviceConfig, Keepalive, PairRequest, Role, RoleDefaults};
use crate::normalize::{normalize_device, normalize_pair, NormalizationWarning};
use crate::render::Renderer;
use crate::synthesis::synthesize;
use crate::validation::{
    schema, validate, validate_document, validate_pair, ValidationError, ValidationResult, ViolationKind,
};

/// Outcome of checking one device document
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<NormalizationWarning>,
}

/// A device document that went through normalization and validation.
/// `config` is present only when the document deserialized.
#[derive(Debug, Clone)]
pub struct PreparedDevice {
    pub config: Option<DeviceConfig>,
    pub validation: ValidationResult,
    pub warnings: Vec<NormalizationWarning>,
}

impl PreparedDevice {
    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            valid: self.validation.valid,
            errors: self.validation.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }

    /// The config when it is present and valid.
    pub fn valid_config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref().filter(|_| self.validation.valid)
    }
}

/// Response of single-device generation
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<ValidationError>>,
    pub warnings: Vec<NormalizationWarning>,
}

/// Everything produced for one switch of a pair
#[derive(Debug, Clone, Serialize)]
pub struct DeviceArtifacts {
    pub role: Role,
    pub hostname: String,
    pub json_filename: String,
    pub cfg_filename: String,
    pub config: DeviceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_error: Option<String>,
}

impl DeviceArtifacts {
    fn new(base: &str, config: DeviceConfig) -> Self {
        let role = config.role();
        Self {
            role,
            hostname: config.switch.hostname.clone(),
            json_filename: format!("{}-{}-config.json", base, role.slug()),
            cfg_filename: format!("{}-{}.cfg", base, role.slug()),
            config,
            rendered: None,
            render_error: None,
        }
    }
}

/// Response of pair generation
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub success: bool,
    pub validation: ValidationResult,
    pub warnings: Vec<NormalizationWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tor1: Option<DeviceArtifacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tor2: Option<DeviceArtifacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmc: Option<DeviceArtifacts>,
}

impl PairReport {
    fn rejected(validation: ValidationResult, warnings: Vec<NormalizationWarning>) -> Self {
        Self {
            success: false,
            validation,
            warnings,
            bundle_name: None,
            tor1: None,
            tor2: None,
            bmc: None,
        }
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceArtifacts> {
        self.tor1.iter().chain(self.tor2.iter()).chain(self.bmc.iter())
    }
}

/// `{base}_{pattern}_{YYYYMMDD_HHMMSS}.zip`
pub fn bundle_name(base: &str, pattern: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}_{}.zip", base, pattern, at.format("%Y%m%d_%H%M%S"))
}

/// Normalize, gate and validate a device document, filling in the
/// role-derived values under `_computed` when it passes.
pub fn prepare_device(mut document: Value) -> PreparedDevice {
    let warnings = normalize_device(&mut document);
    let (mut config, validation) = validate_document(&document);
    // Role-derived values are never taken from the document
    if let Some(config) = config.as_mut() {
        config.computed = Some(RoleDefaults::for_role(config.role()));
    }
    PreparedDevice {
        config,
        validation,
        warnings,
    }
}

/// TOR2 without keepalive addresses mirrors TOR1's.
fn default_tor2_keepalive(request: &mut PairRequest) {
    if request.tor2.has_keepalive() {
        return;
    }
    if let (Some(source_ip), Some(destination_ip)) = (request.tor1.keepalive_source_ip, request.tor1.keepalive_dest_ip) {
        let mirrored = Keepalive {
            source_ip,
            destination_ip,
            vrf: None,
        }
        .swapped();
        request.tor2.keepalive_source_ip = Some(mirrored.source_ip);
        request.tor2.keepalive_dest_ip = Some(mirrored.destination_ip);
    }
}

/// The BMC switch is checked on its own and must not share a TOR's name.
fn validate_bmc(bmc: &DeviceConfig, tors: [&DeviceConfig; 2], result: &mut ValidationResult) {
    result.merge_prefixed("bmc", validate(bmc));
    if tors.iter().any(|tor| tor.switch.hostname == bmc.switch.hostname) {
        result.add(
            ViolationKind::Pair,
            "bmc.switch.hostname",
            format!("BMC switch reuses TOR hostname {}", bmc.switch.hostname),
        );
    }
}

async fn render_into(renderer: &Renderer, artifacts: &mut DeviceArtifacts) {
    match renderer.render(&artifacts.config).await {
        Ok(rendered) => artifacts.rendered = Some(rendered.text),
        Err(e) => {
            warn!(hostname = %artifacts.hostname, "Rendering failed: {}", e);
            artifacts.render_error = Some(e.to_string());
        }
    }
}

/// Stateless generation pipeline over a template store
#[derive(Clone)]
pub struct GenerationService {
    renderer: Renderer,
}

impl GenerationService {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Validate and render one device document.
    pub async fn generate_device(&self, document: Value) -> GenerateResponse {
        let PreparedDevice {
            config,
            validation,
            warnings,
        } = prepare_device(document);
        let config = match config {
            Some(config) if validation.valid => config,
            _ => {
                return GenerateResponse {
                    error: Some("Validation failed".to_string()),
                    validation_errors: Some(validation.errors),
                    warnings,
                    ..Default::default()
                }
            }
        };

        match self.renderer.render(&config).await {
            Ok(rendered) => GenerateResponse {
                success: true,
                config: Some(rendered.text),
                filename: Some(rendered.filename),
                warnings,
                ..Default::default()
            },
            Err(e) => {
                warn!(hostname = %config.switch.hostname, "Rendering failed: {}", e);
                GenerateResponse {
                    error: Some(e.to_string()),
                    warnings,
                    ..Default::default()
                }
            }
        }
    }

    /// Build, validate and render both TORs of a rack from a pair request,
    /// plus its BMC switch when the request has a `bmc` block.
    ///
    /// Violations come back in the report and stop the pipeline before
    /// rendering. A value that cannot be derived is an `Err`. A failed render
    /// is recorded on its device and does not affect the sibling.
    pub async fn generate_pair(&self, mut request: Value) -> Result<PairReport, ConfigError> {
        let warnings = normalize_pair(&mut request);
        let gate = schema::check_pair(&request);
        if !gate.valid {
            return Ok(PairReport::rejected(gate, warnings));
        }
        let mut request: PairRequest = match serde_json::from_value(request) {
            Ok(request) => request,
            Err(e) => {
                let mut result = ValidationResult::new();
                result.add(ViolationKind::Schema, "root", e.to_string());
                return Ok(PairReport::rejected(result, warnings));
            }
        };
        default_tor2_keepalive(&mut request);

        let tor1 = synthesize(&request.shared, &request.tor1, Role::Tor1)?;
        let tor2 = synthesize(&request.shared, &request.tor2, Role::Tor2)?;
        let bmc = request
            .bmc
            .as_ref()
            .map(|overrides| synthesize(&request.shared, overrides, Role::Bmc))
            .transpose()?;

        let mut validation = validate_pair(&tor1, &tor2);
        if let Some(bmc) = &bmc {
            validate_bmc(bmc, [&tor1, &tor2], &mut validation);
        }
        if !validation.valid {
            info!(errors = validation.errors.len(), "Pair rejected by validation");
            return Ok(PairReport::rejected(validation, warnings));
        }

        let base = request.shared.base_hostname.as_str();
        let mut tor1 = DeviceArtifacts::new(base, tor1);
        let mut tor2 = DeviceArtifacts::new(base, tor2);
        let mut bmc = bmc.map(|config| DeviceArtifacts::new(base, config));
        tokio::join!(
            render_into(&self.renderer, &mut tor1),
            render_into(&self.renderer, &mut tor2),
            async {
                if let Some(bmc) = bmc.as_mut() {
                    render_into(&self.renderer, bmc).await;
                }
            }
        );

        let success = [Some(&tor1), Some(&tor2), bmc.as_ref()]
            .into_iter()
            .flatten()
            .all(|d| d.render_error.is_none());
        info!(base, success, bmc = bmc.is_some(), "Generated TOR pair");
        Ok(PairReport {
            success,
            validation,
            warnings,
            bundle_name: Some(bundle_name(
                base,
                request.shared.deployment_pattern.as_str(),
                Utc::now(),
            )),
            tor1: Some(tor1),
            tor2: Some(tor2),
            bmc,
        })
    }
}

/// Write the JSON and rendered text of every device in `report` to `dir`.
pub async fn write_pair_artifacts(report: &PairReport, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::new();
    for device in report.devices() {
        let json_path = dir.join(&device.json_filename);
        tokio::fs::write(&json_path, serde_json::to_string_pretty(&device.config)?).await?;
        written.push(json_path);

        if let Some(text) = &device.rendered {
            let cfg_path = dir.join(&device.cfg_filename);
            tokio::fs::write(&cfg_path, text).await?;
            written.push(cfg_path);
        }
    }
    Ok(written)
}
