use std::error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    InvalidKey(std::string::String),
    InvalidMode(std::string::String),
    InvalidValue(std::string::String, std::string::String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ControlError::InvalidKey(key) => write!(f, "Chave inválida: {}", key),
            ControlError::InvalidMode(mode) => write!(f, "Modo inválido: {}", mode),
            ControlError::InvalidValue(key, value) => {
                write!(f, "Valor inválido para {}: {}", key, value)
            }
        }
    }
}

impl error::Error for ControlError {}
