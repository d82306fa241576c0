use clap::Parser;
use serde::Deserialize;

use rowbind_api::record::{FieldDesc, FieldKind};
use rowbind_engine::RecordLayout;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "rowbind",
    about = "Materialize a JSON query response into records described by a TOML layout"
)]
pub struct Cli {
    /// Path to the TOML record layout.
    #[arg(long, default_value = "layout.toml", env = "ROWBIND_LAYOUT")]
    pub layout: String,

    /// Path to the JSON query response, `-` for stdin.
    #[arg(long, default_value = "-", env = "ROWBIND_INPUT")]
    pub input: String,
}

// ---- TOML layout ----

#[derive(Debug, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub optional: bool,
}

impl LayoutConfig {
    pub fn load(path: &str) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            context: "read",
            detail: format!("'{path}': {e}"),
        })?;
        Self::parse(&content).map_err(|e| match e {
            CliError::Config { context, detail } => CliError::Config {
                context,
                detail: format!("'{path}': {detail}"),
            },
            other => other,
        })
    }

    pub fn parse(toml_str: &str) -> Result<Self, CliError> {
        toml::from_str(toml_str).map_err(|e| CliError::Config {
            context: "parse",
            detail: e.to_string(),
        })
    }

    pub fn into_layout(self) -> Result<RecordLayout, CliError> {
        let fields = self
            .fields
            .into_iter()
            .map(|field| {
                let kind: FieldKind =
                    field
                        .field_type
                        .parse()
                        .map_err(|source| CliError::FieldType {
                            field: field.name.clone(),
                            source,
                        })?;
                let mut desc = FieldDesc::new(field.name, kind);
                if let Some(alias) = field.alias {
                    desc = desc.with_alias(alias);
                }
                if field.optional {
                    desc = desc.optional();
                }
                Ok(desc)
            })
            .collect::<Result<Vec<_>, CliError>>()?;
        Ok(RecordLayout::new(fields))
    }
}

#[cfg(test)]
mod tests {
    use rowbind_api::record::RecordBinder;

    use super::*;

    #[test]
    fn parses_layout() {
        let config = LayoutConfig::parse(
            r#"
            [[fields]]
            name = "A"
            alias = "alpha"
            type = "i64"

            [[fields]]
            name = "note"
            type = "String"
            optional = true
            "#,
        )
        .unwrap();
        let layout = config.into_layout().unwrap();
        assert_eq!(
            layout.fields(),
            [
                FieldDesc::new("A", FieldKind::I64).with_alias("alpha"),
                FieldDesc::new("note", FieldKind::Str).optional(),
            ]
        );
    }

    #[test]
    fn unknown_type_names_the_field() {
        let config = LayoutConfig::parse(
            r#"
            [[fields]]
            name = "blob"
            type = "bytes"
            "#,
        )
        .unwrap();
        let err = config.into_layout().unwrap_err();
        assert!(err.to_string().starts_with("field 'blob': unknown field type 'bytes'"));
    }

    #[test]
    fn missing_type_is_a_parse_error() {
        let err = LayoutConfig::parse("[[fields]]\nname = \"a\"\n").unwrap_err();
        assert!(matches!(err, CliError::Config { context: "parse", .. }));
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["rowbind"]).unwrap();
        assert_eq!(cli.input, "-");
        let cli =
            Cli::try_parse_from(["rowbind", "--layout", "l.toml", "--input", "r.json"]).unwrap();
        assert_eq!(cli.layout, "l.toml");
        assert_eq!(cli.input, "r.json");
    }
}
