use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Access to or assignment of a field the schema never declared.
    Schema,
    /// A declared coercion rejected the raw value.
    Coercion,
    /// Application-level error payload (`errors`/`message` keys).
    Api,
    /// 401 http-status.
    Unauthorized,
    /// 403 http-status.
    Forbidden,
    /// 404 http-status.
    NotFound,
    /// 405 http-status.
    MethodNotAllowed,
    Io,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    field: Option<String>,
    status: Option<u16>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

pub type ApiResult<T> = Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            field: None,
            status: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {field})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn display_includes_optional_context() {
        let err = Error::new(ErrorKind::NotFound)
            .with_message("Resource not found")
            .with_status(404);
        assert_eq!(err.to_string(), "NotFound: Resource not found (status: 404)");
    }

    #[test]
    fn display_includes_field_for_schema_errors() {
        let err = Error::new(ErrorKind::Schema)
            .with_message("undeclared field")
            .with_field("pixel");
        assert_eq!(err.to_string(), "Schema: undeclared field (field: pixel)");
    }

    #[test]
    fn kind_and_accessors_round_trip() {
        let err = Error::new(ErrorKind::Api).with_message("400: bad id");
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.message(), Some("400: bad id"));
        assert_eq!(err.status(), None);
    }
}
