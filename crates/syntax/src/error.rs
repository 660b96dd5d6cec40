use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyntaxError>;

#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("Failed to load C# grammar: {0}")]
    Language(String),

    #[error("Parser produced no tree for {0}")]
    Parse(String),
}
