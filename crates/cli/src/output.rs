//! Structured output handling for CLI commands.

use serde::Serialize;

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq, Copy)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn is_machine_readable(&self) -> bool {
        match self {
            OutputFormat::Human => false,
            OutputFormat::Json | OutputFormat::Yaml => true,
        }
    }
}

#[derive(Serialize)]
pub struct CommandResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> CommandResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            exit_code: Some(0),
            data,
        }
    }

    pub fn error(message: String, exit_code: i32, data: T) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message),
            exit_code: Some(exit_code),
            data,
        }
    }
}

pub fn render<T: Serialize>(format: OutputFormat, data: &T) -> anyhow::Result<Option<String>> {
    Ok(match format {
        OutputFormat::Human => None,
        OutputFormat::Json => Some(serde_json::to_string_pretty(data)?),
        OutputFormat::Yaml => Some(serde_yaml::to_string(data)?),
    })
}

/// Prints a success envelope; human output is printed by the commands themselves.
pub fn print_success<T: Serialize>(format: OutputFormat, data: T) -> anyhow::Result<()> {
    if let Some(text) = render(format, &CommandResponse::success(data))? {
        println!("{}", text);
    }
    Ok(())
}

/// Human errors are printed to stderr by `main`.
pub fn print_error<T: Serialize>(
    format: OutputFormat,
    message: &str,
    exit_code: i32,
    data: T,
) -> anyhow::Result<()> {
    if let Some(text) = render(format, &CommandResponse::error(message.to_string(), exit_code, data))? {
        println!("{}", text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Names {
        names: Vec<&'static str>,
    }

    #[test]
    fn test_success_envelope_flattens_data() {
        let json = render(
            OutputFormat::Json,
            &CommandResponse::success(Names {
                names: vec!["ORACLE"],
            }),
        )
        .unwrap()
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["exit_code"], 0);
        assert_eq!(value["names"][0], "ORACLE");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_error_envelope_in_yaml() {
        let yaml = render(OutputFormat::Yaml, &CommandResponse::error("boom".into(), 3, ()))
            .unwrap()
            .unwrap();
        assert!(yaml.contains("status: error"));
        assert!(yaml.contains("message: boom"));
        assert!(yaml.contains("exit_code: 3"));
    }

    #[test]
    fn test_human_renders_nothing() {
        assert!(render(OutputFormat::Human, &CommandResponse::success(())).unwrap().is_none());
        assert!(!OutputFormat::Human.is_machine_readable());
        assert!(OutputFormat::Yaml.is_machine_readable());
    }
}
