use serde_derive::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    pub grammar: GrammarConfig,

    #[serde(default)]
    pub query: QueryOptions,

    #[serde(default)]
    pub output: OutputOptions,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GrammarConfig {
    pub path: String,

    /// Overrides the `start` option of the grammar header.
    #[serde(default)]
    pub start: Option<String>,
}

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Count,
    Enumerate,
    Sample,
    Fuzz,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub mode: QueryMode,

    pub length: usize,

    /// Count mode reports every length from `length` up to this one.
    pub max_length: Option<usize>,

    pub samples: usize,

    pub seed: Option<u64>,

    /// Only used by the unguided fuzzer.
    pub depth_limit: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            mode: QueryMode::default(),
            length: 0,
            max_length: None,
            samples: 10,
            seed: None,
            depth_limit: 30,
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct OutputOptions {
    pub format: OutputFormat,

    /// Print token hex codes next to rendered strings.
    pub tokens: bool,

    /// Dump the session log after the run.
    pub verbose: bool,
}

#[derive(Debug)]
pub enum ConfigReadError {
    ReadError(std::io::Error),
    ParseError(toml::de::Error),
}

pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> Result<RunConfig, ConfigReadError> {
    let config = std::fs::read_to_string(path).map_err(ConfigReadError::ReadError)?;

    parse_config(&config)
}

pub fn parse_config(content: &str) -> Result<RunConfig, ConfigReadError> {
    toml::from_str::<RunConfig>(content).map_err(ConfigReadError::ParseError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse_config(
            r#"
            [grammar]
            path = "sentences.grammar"
            "#,
        )
        .unwrap();

        assert_eq!(config.grammar.path, "sentences.grammar");
        assert_eq!(config.grammar.start, None);
        assert_eq!(config.query.mode, QueryMode::Count);
        assert_eq!(config.query.samples, 10);
        assert_eq!(config.query.depth_limit, 30);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.verbose);
    }

    #[test]
    fn reads_all_sections() {
        let config = parse_config(
            r#"
            [grammar]
            path = "g.txt"
            start = "sentence"

            [query]
            mode = "sample"
            length = 11
            samples = 3
            seed = 42

            [output]
            format = "json"
            verbose = true
            "#,
        )
        .unwrap();

        assert_eq!(config.grammar.start.as_deref(), Some("sentence"));
        assert_eq!(config.query.mode, QueryMode::Sample);
        assert_eq!(config.query.length, 11);
        assert_eq!(config.query.samples, 3);
        assert_eq!(config.query.seed, Some(42));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = parse_config(
            r#"
            [grammar]
            path = "g.txt"
            [query]
            mode = "shuffle"
            "#,
        );

        assert!(matches!(err, Err(ConfigReadError::ParseError(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_config("/nonexistent/lenfuzz.toml");
        assert!(matches!(err, Err(ConfigReadError::ReadError(_))));
    }
}
