//! Recap copy (theme) and application configuration.
//!
//! The copy holds every text and constant the recap deriver needs, so two
//! quiz themes differ only by configuration. The application configuration is
//! read from `antigaspi.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Narrative and tip shown for one feedback tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCopy {
    pub narrative: String,
    pub tip: String,
}

/// Optional hook computing an annual waste cost from two numeric answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEnrichment {
    /// Question id whose answer is the food budget per period.
    pub budget_answer_id: u32,
    /// Question id whose answer is the share of food thrown away, in percent.
    pub waste_answer_id: u32,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_periods_per_year() -> f64 {
    52.0
}

fn default_currency() -> String {
    "€".to_string()
}

/// Texts and constants used to build the recap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecapCopy {
    /// Theme name, shown in rendered reports.
    pub theme: String,
    pub high: TierCopy,
    pub medium: TierCopy,
    pub low: TierCopy,
    /// Reference yearly waste per person (`K`), in `waste_unit`.
    pub waste_reference: f64,
    pub waste_unit: String,
    /// Label shown in the breakdown for questions without a recorded answer.
    pub unanswered_label: String,
    /// Chart legend for the part of the score range avoided.
    pub good_label: String,
    /// Chart legend for the part of the score range reached.
    pub bad_label: String,
    pub cost: Option<CostEnrichment>,
}

impl Default for RecapCopy {
    fn default() -> Self {
        Self {
            theme: "anti-gaspi".into(),
            high: TierCopy {
                narrative: "Félicitations ! Vous êtes un champion de l'anti-gaspillage alimentaire. \
                            Vos habitudes préservent les ressources et la planète !"
                    .into(),
                tip: "Partagez vos restes alimentaires avec des applications comme \
                      'Too Good To Go' ou dans votre communauté locale !"
                    .into(),
            },
            medium: TierCopy {
                narrative: "Pas mal ! Vous avez de bonnes pratiques mais quelques ajustements \
                            peuvent encore réduire votre gaspillage alimentaire."
                    .into(),
                tip: "Planifiez vos repas à l'avance et n'achetez que ce dont vous avez besoin. \
                      Cela réduit les achats impulsifs et le gaspillage."
                    .into(),
            },
            low: TierCopy {
                narrative: "Il y a de la marge de progression ! De petits changements dans vos \
                            habitudes peuvent faire une grande différence."
                    .into(),
                tip: "Apprenez à conserver correctement vos aliments et à comprendre la \
                      différence entre 'à consommer de préférence avant' et 'à consommer jusqu'au'."
                    .into(),
            },
            waste_reference: 30.0,
            waste_unit: "kg".into(),
            unanswered_label: "Non répondu".into(),
            good_label: "Anti-Gaspi (%)".into(),
            bad_label: "Gaspillage (%)".into(),
            cost: None,
        }
    }
}

/// Top-level antigaspi configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Question bank used when `--bank` is not given.
    #[serde(default)]
    pub bank: Option<PathBuf>,
    /// Default recap output format.
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory where saved recaps are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Copy overriding the one declared in the question bank.
    #[serde(default)]
    pub copy: Option<RecapCopy>,
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./antigaspi-results")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bank: None,
            format: default_format(),
            output_dir: default_output_dir(),
            copy: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the well-known paths:
/// 1. `antigaspi.toml` in the current directory
/// 2. `~/.config/antigaspi/config.toml`
///
/// `ANTIGASPI_BANK` overrides the default bank path.
pub fn load_config_from(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("antigaspi.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<AppConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => AppConfig::default(),
    };

    if let Ok(bank) = std::env::var("ANTIGASPI_BANK") {
        config.bank = Some(PathBuf::from(bank));
    }

    config.bank = config.bank.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("antigaspi"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ANTIGASPI_TEST_VAR", "banks");
        assert_eq!(resolve_env_vars("${_ANTIGASPI_TEST_VAR}"), "banks");
        assert_eq!(
            resolve_env_vars("./${_ANTIGASPI_TEST_VAR}/quiz.json"),
            "./banks/quiz.json"
        );
        assert_eq!(resolve_env_vars("no ${closing"), "no ${closing");
        std::env::remove_var("_ANTIGASPI_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.format, "text");
        assert!(config.bank.is_none());
        assert_eq!(config.output_dir, PathBuf::from("./antigaspi-results"));
    }

    #[test]
    fn default_copy_constants() {
        let copy = RecapCopy::default();
        assert_eq!(copy.waste_reference, 30.0);
        assert_eq!(copy.unanswered_label, "Non répondu");
        assert!(copy.cost.is_none());
    }

    #[test]
    fn parse_config_with_copy_override() {
        let toml_str = r#"
bank = "banks/example.json"
format = "markdown"

[copy]
theme = "budget"
waste_reference = 40.0

[copy.cost]
budget_answer_id = 21
waste_answer_id = 22
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.format, "markdown");
        let copy = config.copy.unwrap();
        assert_eq!(copy.theme, "budget");
        assert_eq!(copy.waste_reference, 40.0);
        assert_eq!(copy.unanswered_label, "Non répondu");
        let cost = copy.cost.unwrap();
        assert_eq!(cost.budget_answer_id, 21);
        assert_eq!(cost.periods_per_year, 52.0);
        assert_eq!(cost.currency, "€");
    }

    #[test]
    fn explicit_missing_config_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/antigaspi.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("antigaspi.toml");
        std::fs::write(&path, "format = \"json\"\noutput_dir = \"out\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.format, "json");
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
