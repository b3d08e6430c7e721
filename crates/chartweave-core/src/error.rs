use crate::outcome::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid placeholder token: {token:?} (expected `${{name}}`)")]
    InvalidPlaceholder { token: String },

    #[error("Invalid {format} configuration: {message}")]
    InvalidConfig {
        format: &'static str,
        message: String,
    },

    #[error("Unknown chart id: {chart_id}")]
    UnknownChart { chart_id: String },

    #[error("Invalid mapping document: {message}")]
    InvalidMapping { message: String },

    #[error("Unresolved bindings: {summary}")]
    Binding {
        summary: String,
        diagnostics: Vec<Diagnostic>,
    },
}
