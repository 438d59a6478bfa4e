//! Owning-identity address used to scope task records to one user.

use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::*;

/// Identity of the user owning a task record. Set at creation, never changed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserEmail(String);

impl std::fmt::Display for UserEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserEmail {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parse(input: &str) -> Result<Self, InvalidUserEmail> {
        let candidate = input.trim();
        if candidate.is_empty() {
            return Err(InvalidUserEmail::Empty);
        }
        match candidate.split_once('@') {
            None => Err(InvalidUserEmail::MissingAtSign(candidate.to_string())),
            Some(("", _)) => Err(InvalidUserEmail::MissingLocalPart(candidate.to_string())),
            Some((_, "")) => Err(InvalidUserEmail::MissingDomain(candidate.to_string())),
            Some((local, domain)) if local.contains(char::is_whitespace) || domain.contains(char::is_whitespace) => {
                Err(InvalidUserEmail::EmbeddedWhitespace(candidate.to_string()))
            }
            Some(_) => Ok(UserEmail(candidate.to_string())),
        }
    }
}

impl<'a> TryFrom<&'a str> for UserEmail {
    type Error = InvalidUserEmail;

    fn try_from(input: &'a str) -> Result<Self, Self::Error> {
        UserEmail::parse(input)
    }
}

/// Creates an owning identity from a String
///
/// # Examples
///
/// ```
/// # use taskboard::UserEmail;
/// # use std::convert::TryFrom;
///
/// let email = UserEmail::try_from("a@x.com".to_string());
/// assert!(email.is_ok());
/// ```
impl TryFrom<String> for UserEmail {
    type Error = InvalidUserEmail;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        UserEmail::parse(&input)
    }
}

impl<'a> TryFrom<&'a String> for UserEmail {
    type Error = InvalidUserEmail;

    fn try_from(input: &'a String) -> Result<Self, Self::Error> {
        UserEmail::parse(input)
    }
}

impl From<UserEmail> for String {
    fn from(email: UserEmail) -> Self {
        email.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidUserEmail {
    #[error("email address is empty")]
    Empty,
    #[error("email address '{0}' has no @ sign")]
    MissingAtSign(String),
    #[error("email address '{0}' has no local part")]
    MissingLocalPart(String),
    #[error("email address '{0}' has no domain")]
    MissingDomain(String),
    #[error("email address '{0}' contains whitespace")]
    EmbeddedWhitespace(String),
}
