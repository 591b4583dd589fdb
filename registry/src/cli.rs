//! CLI module for the prover registry
//!
//! The server is configured entirely through environment variables; the CLI
//! only exposes help and version output.

use clap::Parser;

/// Prover registry - caches reachable prover endpoints per network
#[derive(Parser, Debug)]
#[command(name = "prover-registry")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    PROVER_REGISTRY_HOST                Bind address (default: 0.0.0.0)
    PROVER_REGISTRY_PORT                Listen port (default: 8090)
    PROVER_REGISTRY_DATABASE_URL        SQLite URL (default: sqlite://pb_data/registry.db)
    PROVER_REGISTRY_CACHE_BACKEND       Cache backend: sqlite | memory (default: sqlite)
    PROVER_REGISTRY_PUBLIC_DIR          Static file directory (default: ./pb_public)
    PROVER_REGISTRY_PROBE_TIMEOUT_SECS  Prover /status timeout in seconds (default: 4)
    PROVER_REGISTRY_LOG_LEVEL           Log filter (default: info)
    PROVER_REGISTRY_LOG_FORMAT          Log format: pretty | json (default: pretty)
    PROVER_REGISTRY_LOG_DIR             Also write daily-rotated JSON logs here
"#)]
pub struct Cli {}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_no_args_starts_server() {
        assert!(Cli::try_parse_from(["prover-registry"]).is_ok());
    }

    #[test]
    fn test_help_lists_environment_variables() {
        let err = Cli::try_parse_from(["prover-registry", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("PROVER_REGISTRY_CACHE_BACKEND"));
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["prover-registry", "-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_unknown_arg_rejected() {
        let err = Cli::try_parse_from(["prover-registry", "--unknown"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
