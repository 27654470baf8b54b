use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::allocator::Paging;
use crate::models::Day;

/// Settings for one report run. Every field is optional here so the TOML file
/// and the command line can each supply part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    pub sheet: Option<String>,
    pub day: Option<Day>,
    pub csv: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub paging: Option<Paging>,
}

impl RunSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Values set in `self` win over `base`.
    pub fn over(self, base: RunSettings) -> RunSettings {
        RunSettings {
            sheet: self.sheet.or(base.sheet),
            day: self.day.or(base.day),
            csv: self.csv.or(base.csv),
            template: self.template.or(base.template),
            output: self.output.or(base.output),
            summary: self.summary.or(base.summary),
            paging: self.paging.or(base.paging),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub sheet_name: String,
    pub day: Day,
    /// Read the roster from this file instead of the database.
    pub csv: Option<PathBuf>,
    pub template: PathBuf,
    pub output: PathBuf,
    pub summary: Option<PathBuf>,
    pub paging: Paging,
}

impl TryFrom<RunSettings> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(settings: RunSettings) -> anyhow::Result<Self> {
        let sheet_name = match (settings.sheet, &settings.csv) {
            (Some(sheet), _) if !sheet.trim().is_empty() => sheet,
            (_, Some(csv)) => csv
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "roster".to_string()),
            _ => bail!("a sheet name is required (--sheet or `sheet` in the config file)"),
        };
        let Some(day) = settings.day else {
            bail!("a lesson day is required (--day or `day` in the config file)");
        };
        let Some(template) = settings.template else {
            bail!("a template workbook is required (--template or `template` in the config file)");
        };
        let Some(output) = settings.output else {
            bail!("an output path is required (--out or `output` in the config file)");
        };

        Ok(RunConfig {
            sheet_name,
            day,
            csv: settings.csv,
            template,
            output,
            summary: settings.summary,
            paging: settings.paging.unwrap_or_default(),
        })
    }
}

pub fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL").context("DATABASE_URL must be set to the roster Postgres instance")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_file() {
        let settings: RunSettings = toml::from_str(
            r#"
            sheet = "Spring Session 2026"
            day = "saturday"
            template = "templates/progress-card.json"
            output = "out/saturday.json"
            paging = "fresh-page-per-instructor"
            "#,
        )
        .unwrap();

        assert_eq!(settings.day, Some(Day::Saturday));
        assert_eq!(settings.paging, Some(Paging::FreshPagePerInstructor));
        assert!(settings.csv.is_none());
    }

    #[test]
    fn example_config_is_complete() {
        let settings: RunSettings = toml::from_str(include_str!("../prereg.example.toml")).unwrap();
        let config = RunConfig::try_from(settings).unwrap();
        assert_eq!(config.sheet_name, "Spring Session 2026");
        assert_eq!(config.template, PathBuf::from("templates/progress-card.json"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<RunSettings>("sheets = \"x\"").is_err());
    }

    #[test]
    fn command_line_overrides_file() {
        let file = RunSettings {
            sheet: Some("Spring".to_string()),
            day: Some(Day::Friday),
            template: Some(PathBuf::from("t.json")),
            output: Some(PathBuf::from("a.json")),
            ..RunSettings::default()
        };
        let cli = RunSettings {
            day: Some(Day::Sunday),
            output: Some(PathBuf::from("b.json")),
            ..RunSettings::default()
        };
        let config = RunConfig::try_from(cli.over(file)).unwrap();

        assert_eq!(config.sheet_name, "Spring");
        assert_eq!(config.day, Day::Sunday);
        assert_eq!(config.output, PathBuf::from("b.json"));
        assert_eq!(config.paging, Paging::Continuous);
    }

    #[test]
    fn csv_name_stands_in_for_sheet() {
        let settings = RunSettings {
            day: Some(Day::Other),
            csv: Some(PathBuf::from("exports/wednesday-roster.csv")),
            template: Some(PathBuf::from("t.json")),
            output: Some(PathBuf::from("o.json")),
            ..RunSettings::default()
        };
        let config = RunConfig::try_from(settings).unwrap();
        assert_eq!(config.sheet_name, "wednesday-roster");
    }

    #[test]
    fn missing_fields_are_errors() {
        let settings = RunSettings {
            sheet: Some("Spring".to_string()),
            ..RunSettings::default()
        };
        let error = RunConfig::try_from(settings).unwrap_err();
        assert!(error.to_string().contains("lesson day"));
    }
}
