//! Authentication primitives: login credentials and registration input.
//!
//! Inbound adapters hand raw strings to these constructors; only validated
//! values reach the account service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, PersonName, UserValidationError, Username};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty; whitespace is preserved.
///
/// # Examples
/// ```
/// use design_desk::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" maria ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "maria");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for the account lookup.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Registration form field names, as reported back to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    Username,
    Email,
    FirstName,
    LastName,
    Password,
    PasswordConfirm,
}

impl RegistrationField {
    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Password => "password",
            Self::PasswordConfirm => "passwordConfirm",
        }
    }
}

/// Why a registration form was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// A user field failed its own validation.
    Field {
        field: RegistrationField,
        source: UserValidationError,
    },
    /// A required name was blank.
    MissingName { field: RegistrationField },
    /// Password was blank.
    EmptyPassword,
    /// Password and confirmation differ.
    PasswordMismatch,
    /// Username already belongs to another account.
    UsernameTaken,
    /// Email already belongs to another account.
    EmailTaken,
}

impl RegistrationValidationError {
    /// Field the error should be displayed against.
    pub fn field(&self) -> RegistrationField {
        match self {
            Self::Field { field, .. } | Self::MissingName { field } => *field,
            Self::EmptyPassword => RegistrationField::Password,
            Self::PasswordMismatch => RegistrationField::PasswordConfirm,
            Self::UsernameTaken => RegistrationField::Username,
            Self::EmailTaken => RegistrationField::Email,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Field { .. } => "invalid_value",
            Self::MissingName { .. } => "missing_field",
            Self::EmptyPassword => "empty_password",
            Self::PasswordMismatch => "password_mismatch",
            Self::UsernameTaken => "username_taken",
            Self::EmailTaken => "email_taken",
        }
    }
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { source, .. } => write!(f, "{source}"),
            Self::MissingName { field } => write!(f, "{} must not be empty", field.as_str()),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::UsernameTaken => write!(f, "username is already taken"),
            Self::EmailTaken => write!(f, "email is already registered"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Raw registration form values.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
}

/// Validated registration request. Uniqueness is checked by the service.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    first_name: PersonName,
    last_name: PersonName,
    password: Zeroizing<String>,
}

fn required_name(
    raw: &str,
    field: RegistrationField,
) -> Result<PersonName, RegistrationValidationError> {
    let name =
        PersonName::new(raw).map_err(|source| RegistrationValidationError::Field { field, source })?;
    if name.as_ref().is_empty() {
        return Err(RegistrationValidationError::MissingName { field });
    }
    Ok(name)
}

impl Registration {
    /// Validate a registration form.
    ///
    /// Fields are checked in form order; the first failure is returned.
    pub fn try_from_input(input: &RegistrationInput<'_>) -> Result<Self, RegistrationValidationError> {
        let username =
            Username::new(input.username).map_err(|source| RegistrationValidationError::Field {
                field: RegistrationField::Username,
                source,
            })?;
        let email =
            EmailAddress::new(input.email).map_err(|source| RegistrationValidationError::Field {
                field: RegistrationField::Email,
                source,
            })?;
        let first_name = required_name(input.first_name, RegistrationField::FirstName)?;
        let last_name = required_name(input.last_name, RegistrationField::LastName)?;
        if input.password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        if input.password != input.password_confirm {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        Ok(Self {
            username,
            email,
            first_name,
            last_name,
            password: Zeroizing::new(input.password.to_owned()),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
