use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlinkError {
    #[error("Sensor handshake error: {0}")]
    Handshake(String),

    #[error("Device unresponsive after {polls} handshake polls")]
    DeviceUnresponsive { polls: u32 },

    #[error("Register bus error: {0}")]
    Bus(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Failed to parse recording: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BlinkError>;
