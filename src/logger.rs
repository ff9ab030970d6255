use std::path::Path;

/// Default log4rs configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "shelfquery-log4rs.yaml";

/// Initializes the logging system from [`DEFAULT_CONFIG`].
///
/// Call once before constructing descriptors if guard-limit warnings should
/// be captured.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    init_from(DEFAULT_CONFIG)
}

/// Initializes the logging system from a specific log4rs configuration file.
pub fn init_from<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, Default::default())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_from_missing_config_is_an_error() {
        assert!(init_from("no-such-config.yaml").is_err());
    }
}
