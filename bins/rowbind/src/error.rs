use rowbind_api::record::UnknownFieldKind;
use rowbind_engine::BindError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("field '{field}': {source}")]
    FieldType {
        field: String,
        #[source]
        source: UnknownFieldKind,
    },

    #[error("input '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Bind(#[from] BindError),

    #[error("output: {0}")]
    Output(#[from] std::io::Error),

    #[error("output: {0}")]
    Encode(#[from] serde_json::Error),
}
