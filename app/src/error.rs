use irrigation_core::error::ControlError;
use std::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DBError {
    #[error(transparent)]
    SQLError(#[from] sqlx::Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Configuração não encontrada")]
    ConfigurationNotFound,
    #[error("Invalid stored value: {0}")]
    Corrupt(std::string::String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {0}: {1}")]
    Invalid(&'static str, std::string::String),
}

/// Request level error, each case maps onto one HTTP status
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    User(Box<dyn error::Error + Send + Sync>),
    #[error(transparent)]
    NotFound(Box<dyn error::Error + Send + Sync>),
    #[error(transparent)]
    Internal(Box<dyn error::Error + Send + Sync>),
}

impl From<DBError> for ServiceError {
    fn from(err: DBError) -> Self {
        match err {
            DBError::ConfigurationNotFound => ServiceError::NotFound(Box::from(err)),
            DBError::SQLError(_) | DBError::IOError(_) | DBError::Corrupt(_) => {
                ServiceError::Internal(Box::from(err))
            }
        }
    }
}

impl From<ControlError> for ServiceError {
    fn from(err: ControlError) -> Self {
        ServiceError::User(Box::from(err))
    }
}
