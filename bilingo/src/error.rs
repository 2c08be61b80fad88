use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not detect the language of paragraph starting with \"{excerpt}\"")]
    LanguageUndetected { excerpt: String },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Sentence detection failed: {0}")]
    SentenceDetection(String),

    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    #[error("Markup document contains no <voice> turns")]
    NoVoiceTurns,

    #[error("Voice turn limit must be greater than zero")]
    InvalidTurnLimit,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Translation failed: {0}")]
    Translation(#[from] llm_client::LlmError),

    #[error("Model returned malformed bilingual text: {0}")]
    MalformedModelOutput(String),

    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Audio chunk {index} of {total} failed: {source}")]
    ChunkFailed {
        index: usize,
        total: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
