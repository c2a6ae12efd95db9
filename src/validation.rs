//! Client-side checks for the storefront login and registration forms.

use crate::action_framework::FormData;
use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountForm {
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
        accept_terms: bool,
    },
}

impl AccountForm {
    /// Checks run in the order the user is told about them: missing fields,
    /// password mismatch, password length, terms.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            AccountForm::Login { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(ValidationError::MissingFields);
                }
                Ok(())
            }
            AccountForm::Register {
                username,
                email,
                password,
                confirm_password,
                accept_terms,
            } => {
                if [username, email, password, confirm_password]
                    .iter()
                    .any(|field| field.is_empty())
                {
                    return Err(ValidationError::MissingRequiredFields);
                }
                if password != confirm_password {
                    return Err(ValidationError::PasswordMismatch);
                }
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Err(ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN });
                }
                if !accept_terms {
                    return Err(ValidationError::TermsNotAccepted);
                }
                Ok(())
            }
        }
    }

    /// Where the form posts to.
    pub fn action(&self) -> &'static str {
        match self {
            AccountForm::Login { .. } => "/login",
            AccountForm::Register { .. } => "/register",
        }
    }

    pub fn to_form(&self) -> FormData {
        match self {
            AccountForm::Login { username, password } => FormData::new()
                .with("username", username.clone())
                .with("password", password.clone()),
            AccountForm::Register {
                username,
                email,
                password,
                confirm_password,
                accept_terms,
            } => {
                let mut form = FormData::new()
                    .with("username", username.clone())
                    .with("email", email.clone())
                    .with("password", password.clone())
                    .with("confirm_password", confirm_password.clone());
                if *accept_terms {
                    form.insert("accept_terms", "on");
                }
                form
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirm: &str, accept_terms: bool) -> AccountForm {
        AccountForm::Register {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
            accept_terms,
        }
    }

    #[test]
    fn mismatched_passwords_are_rejected_first() {
        let err = register("abc", "xyz", false).validate().unwrap_err();
        assert_eq!(err, ValidationError::PasswordMismatch);
        assert_eq!(err.to_string(), "As senhas não coincidem");
    }

    #[test]
    fn short_passwords_and_missing_terms() {
        let err = register("abc", "abc", true).validate().unwrap_err();
        assert_eq!(err.to_string(), "A senha deve ter pelo menos 6 caracteres");

        let err = register("segredo1", "segredo1", false).validate().unwrap_err();
        assert_eq!(err, ValidationError::TermsNotAccepted);

        assert_eq!(register("segredo1", "segredo1", true).validate(), Ok(()));
    }

    #[test]
    fn empty_fields_block_both_forms() {
        let login = AccountForm::Login {
            username: "ana".into(),
            password: String::new(),
        };
        assert_eq!(login.validate(), Err(ValidationError::MissingFields));
        assert_eq!(
            register("", "", true).validate(),
            Err(ValidationError::MissingRequiredFields)
        );
    }
}
