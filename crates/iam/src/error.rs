use std::io::ErrorKind;

pub type Result<T> = core::result::Result<T, Error>;

/// Error taxonomy of the identity store, one variant per IAM wire code.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    AccessDenied(String),

    #[error("entity already exists: {0}")]
    EntityAlreadyExists(String),

    #[error("no such entity: {0}")]
    NoSuchEntity(String),

    #[error("delete conflict: {0}")]
    DeleteConflict(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("crypto: {0}")]
    Crypto(#[from] tidefs_crypto::Error),

    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(std::io::Error),

    #[error("{0}")]
    ServiceFailure(String),
}

impl Error {
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Io(std::io::Error::other(error))
    }

    /// The AWS error code rendered by the XML front end.
    pub fn aws_code(&self) -> &'static str {
        match self {
            Error::AccessDenied(_) => "AccessDeniedException",
            Error::EntityAlreadyExists(_) => "EntityAlreadyExists",
            Error::NoSuchEntity(_) => "NoSuchEntity",
            Error::DeleteConflict(_) => "DeleteConflict",
            Error::LimitExceeded(_) => "LimitExceeded",
            Error::Validation(_) => "ValidationError",
            Error::Crypto(_) | Error::Serde(_) | Error::Io(_) | Error::ServiceFailure(_) => "ServiceFailure",
        }
    }

    /// Errno fallback mapping for paths where no more specific kind applies.
    pub(crate) fn from_io(err: std::io::Error, entity: &str) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Error::NoSuchEntity(entity.to_owned()),
            ErrorKind::AlreadyExists => Error::EntityAlreadyExists(entity.to_owned()),
            ErrorKind::PermissionDenied => Error::AccessDenied(format!("unauthorized access to {entity}")),
            _ => Error::Io(err),
        }
    }
}

pub fn is_err_access_denied(err: &Error) -> bool {
    matches!(err, Error::AccessDenied(_))
}

pub fn is_err_no_such_entity(err: &Error) -> bool {
    matches!(err, Error::NoSuchEntity(_))
}

pub fn is_err_entity_exists(err: &Error) -> bool {
    matches!(err, Error::EntityAlreadyExists(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_codes() {
        assert_eq!(Error::AccessDenied(String::new()).aws_code(), "AccessDeniedException");
        assert_eq!(Error::NoSuchEntity(String::new()).aws_code(), "NoSuchEntity");
        assert_eq!(Error::Validation(String::new()).aws_code(), "ValidationError");
        assert_eq!(Error::ServiceFailure(String::new()).aws_code(), "ServiceFailure");
    }

    #[test]
    fn errno_fallback() {
        let not_found = std::io::Error::new(ErrorKind::NotFound, "gone");
        assert!(is_err_no_such_entity(&Error::from_io(not_found, "user")));

        let exists = std::io::Error::new(ErrorKind::AlreadyExists, "dup");
        assert!(is_err_entity_exists(&Error::from_io(exists, "user")));

        let eperm = std::io::Error::new(ErrorKind::PermissionDenied, "no");
        assert!(is_err_access_denied(&Error::from_io(eperm, "user")));
    }
}
