#[derive(Debug, thiserror::Error)]
pub enum RxError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read rules file: {0}")]
    RulesFileRead(std::io::Error),
    #[error("failed to parse rules YAML: {0}")]
    RulesParse(serde_yaml::Error),
    #[error("failed to serialize rules YAML: {0}")]
    RulesSerialization(serde_yaml::Error),
    #[error("failed to parse prescription JSON: {0}")]
    PrescriptionParse(serde_json::Error),
}

pub type RxResult<T> = std::result::Result<T, RxError>;
