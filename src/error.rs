use thiserror::Error;

/// Everything that can stop an action from completing successfully.
///
/// `Busy`, `UserAborted`, `Validation` and `InvalidRequest` are raised before
/// any request leaves the client. `Transport`, `Application` and `Unexpected`
/// are raised after dispatch and end up in a failed [`ActionResult`].
///
/// [`ActionResult`]: crate::action_framework::ActionResult
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("Control is busy")]
    Busy,
    #[error("Action declined by user")]
    UserAborted,
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid action request: {0}")]
    InvalidRequest(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Application error (status {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Application { status: u16, detail: Option<String> },
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ActionError {
    /// True when the error was raised without issuing a request.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ActionError::Busy
                | ActionError::UserAborted
                | ActionError::Validation(_)
                | ActionError::InvalidRequest(_)
        )
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        ActionError::Transport(err.to_string())
    }
}

/// Client-side form validation failures. The display text is what the user sees.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Por favor, preencha todos os campos")]
    MissingFields,
    #[error("Por favor, preencha todos os campos obrigatórios")]
    MissingRequiredFields,
    #[error("As senhas não coincidem")]
    PasswordMismatch,
    #[error("A senha deve ter pelo menos {min} caracteres")]
    PasswordTooShort { min: usize },
    #[error("Você deve aceitar os termos de uso")]
    TermsNotAccepted,
    #[error("O campo {0} é obrigatório")]
    RequiredField(&'static str),
    #[error("O campo {0} deve ser um número válido")]
    InvalidNumber(&'static str),
}
