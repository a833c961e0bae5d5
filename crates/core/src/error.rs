use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload codec error: {0}")]
    PayloadCodec(String),
}
