use std::fmt;

use crate::model::ReportType;

#[derive(Debug)]
pub enum Error {
    /// Unknown report type or a malformed field map. No document is produced.
    InvalidInput(String),
    /// Composing or re-loading the base document failed.
    Render(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Error::Render(message) => write!(f, "render error: {message}"),
            Error::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

/// Why an attachment contributed no pages. Never fatal to a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    UnsupportedExtension(String),
    InvalidPdf(String),
    Encrypted,
    EmptyDocument,
    InvalidImage(String),
    NotPermitted(ReportType),
}

impl fmt::Display for AttachmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentError::UnsupportedExtension(ext) if ext.is_empty() => {
                write!(f, "file has no extension")
            }
            AttachmentError::UnsupportedExtension(ext) => {
                write!(f, "unsupported extension .{ext}")
            }
            AttachmentError::InvalidPdf(message) => write!(f, "unreadable PDF: {message}"),
            AttachmentError::Encrypted => write!(f, "PDF is encrypted"),
            AttachmentError::EmptyDocument => write!(f, "PDF has no pages"),
            AttachmentError::InvalidImage(message) => write!(f, "unreadable image: {message}"),
            AttachmentError::NotPermitted(report_type) => {
                write!(f, "{report_type} reports do not carry attachments")
            }
        }
    }
}

impl std::error::Error for AttachmentError {}
