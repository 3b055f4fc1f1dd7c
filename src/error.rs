use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),

    #[error("could not open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial_error() -> serialport::Error {
        serialport::Error::new(serialport::ErrorKind::NoDevice, "device gone")
    }

    #[test]
    fn open_error_names_the_port() {
        let error = MonitorError::Open {
            port: "/dev/ttyUSB0".to_string(),
            source: serial_error(),
        };
        let message = error.to_string();
        assert!(message.contains("/dev/ttyUSB0"), "got: {message}");
        assert!(message.contains("device gone"), "got: {message}");
    }

    #[test]
    fn enumerate_error_mentions_enumeration() {
        let error = MonitorError::Enumerate(serial_error());
        assert!(error.to_string().contains("enumerate"));
    }
}
