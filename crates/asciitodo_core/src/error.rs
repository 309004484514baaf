use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    EmptyText(String),
    IndexOutOfRange { index: usize, len: usize },
    InvalidInput(String),
    InvalidData(String),
    Io(String),
}

impl AppError {
    pub fn empty_text<M: Into<String>>(message: M) -> Self {
        Self::EmptyText(message.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyText(_) => "empty_text",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::EmptyText(message) => message.clone(),
            Self::IndexOutOfRange { index, len } => {
                format!("index {index} is out of range for {len} tasks")
            }
            Self::InvalidInput(message) => message.clone(),
            Self::InvalidData(message) => message.clone(),
            Self::Io(message) => message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
