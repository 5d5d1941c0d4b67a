//! Diff subcommand
//!
//! Compares a level's resolved values with its baseline, or two snapshots.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the diff subcommand
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Level to diff against its baseline
    #[arg(long, value_name = "LEVEL", required_unless_present = "against")]
    pub level: Option<String>,

    /// Compare the configured snapshot with this one instead
    #[arg(long, value_name = "FILE", conflicts_with = "level")]
    pub against: Option<PathBuf>,

    /// Output format: text (default), json, or summary
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: DiffFormat,

    /// Only show these groups (or snapshot tables), comma-separated
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub groups: Option<Vec<String>>,
}

/// Output format for diff results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffFormat {
    #[default]
    Text,
    Json,
    Summary,
}

impl std::str::FromStr for DiffFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(DiffFormat::Text),
            "json" => Ok(DiffFormat::Json),
            "summary" => Ok(DiffFormat::Summary),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: text, json, summary",
                s
            )),
        }
    }
}

impl std::fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffFormat::Text => write!(f, "text"),
            DiffFormat::Json => write!(f, "json"),
            DiffFormat::Summary => write!(f, "summary"),
        }
    }
}

impl DiffArgs {
    /// Filter groups if --groups is specified
    pub fn should_include_group(&self, name: &str) -> bool {
        match &self.groups {
            Some(groups) => groups.iter().any(|g| g == name),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_format_parse() {
        assert_eq!("text".parse::<DiffFormat>().unwrap(), DiffFormat::Text);
        assert_eq!("JSON".parse::<DiffFormat>().unwrap(), DiffFormat::Json);
        assert_eq!("summary".parse::<DiffFormat>().unwrap(), DiffFormat::Summary);
        assert!("yaml".parse::<DiffFormat>().is_err());
    }

    #[test]
    fn test_group_filter() {
        let args = DiffArgs {
            level: Some("Titan".to_string()),
            against: None,
            format: DiffFormat::Text,
            groups: Some(vec!["scrap".to_string(), "enemies".to_string()]),
        };
        assert!(args.should_include_group("scrap"));
        assert!(!args.should_include_group("dungeon"));

        let args = DiffArgs { groups: None, ..args };
        assert!(args.should_include_group("dungeon"));
    }
}
