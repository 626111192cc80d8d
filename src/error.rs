use thiserror::Error;

use crate::models::Role;

/// Terminal failures of the synthesis and rendering engine.
///
/// Validation problems are never reported through this type: they are
/// accumulated in a [`crate::validation::ValidationResult`] so a caller can
/// show every violation at once.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid deployment pattern '{0}' (expected switchless, switched or fully_converged)")]
    InvalidPattern(String),

    #[error("invalid switch role '{0}' (expected TOR1, TOR2 or BMC)")]
    InvalidRole(String),

    /// A required per-device value is missing and has no safe default.
    #[error("cannot derive {field} for {role}: {reason}")]
    DerivationAmbiguity {
        role: Role,
        field: String,
        reason: String,
    },

    #[error("template not found: {path} (supported vendors: {})", .supported.join(", "))]
    TemplateNotFound {
        path: String,
        supported: Vec<String>,
    },

    #[error("invalid template {path}: {message}")]
    InvalidTemplate { path: String, message: String },

    #[error("template rendering failed for {hostname}: {message}")]
    Render { hostname: String, message: String },

    #[error("failed to read template {path}: {source}")]
    TemplateIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn ambiguity(role: Role, field: &str, reason: impl Into<String>) -> Self {
        Self::DerivationAmbiguity {
            role,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable category, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPattern(_) | Self::InvalidRole(_) => "invalid_input",
            Self::DerivationAmbiguity { .. } => "derivation_ambiguity",
            Self::TemplateNotFound { .. } => "template_not_found",
            Self::InvalidTemplate { .. } | Self::Render { .. } | Self::TemplateIo { .. } => {
                "render_failed"
            }
        }
    }
}
