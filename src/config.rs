//! Runtime settings for the HTTP server
//!
//! Every setting can come from a command-line flag or an environment
//! variable; flags win. Analysis thresholds are not configurable here.

use clap::Args;
use deckstat_core::error::{DeckstatError, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::data_loader::DataLoader;

/// Flags accepted by `deckstat serve`
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "DECKSTAT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "DECKSTAT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Seconds a cached view stays fresh (0 disables caching)
    #[arg(long, env = "DECKSTAT_CACHE_TTL", default_value_t = 60)]
    pub cache_ttl: u64,

    /// Allowed browser origin, may be repeated
    #[arg(
        long = "cors-origin",
        env = "DECKSTAT_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub cors_origins: Vec<String>,
}

/// Resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub cors_origins: Vec<String>,
}

impl Settings {
    /// Combine `serve` flags with the global data directory
    pub fn from_args(args: &ServeArgs, data_dir: Option<PathBuf>) -> Result<Self> {
        if args.host.trim().is_empty() {
            return Err(DeckstatError::Config("host must not be empty".to_string()));
        }

        let cors_origins: Vec<String> = args
            .cors_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            host: args.host.clone(),
            port: args.port,
            data_dir,
            cache_ttl: Duration::from_secs(args.cache_ttl),
            cors_origins,
        })
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Loader for the configured directory, or the discovered default
    pub fn data_loader(&self) -> Result<DataLoader> {
        data_loader_for(self.data_dir.as_deref())
    }
}

/// Loader rooted at `dir` when given, otherwise [`DataLoader::discover`]
pub fn data_loader_for(dir: Option<&std::path::Path>) -> Result<DataLoader> {
    match dir {
        Some(dir) => Ok(DataLoader::from_path(dir)),
        None => DataLoader::discover(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        let mut argv = vec!["deckstat"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap().serve
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_args(&parse(&[]), None).unwrap();
        assert_eq!(settings.bind_address(), "127.0.0.1:8000");
        assert_eq!(settings.cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.cors_origins, vec!["http://localhost:5173"]);
        assert!(settings.data_dir.is_none());
    }

    #[test]
    fn test_flags_override() {
        let args = parse(&[
            "--host",
            "0.0.0.0",
            "--port",
            "9001",
            "--cache-ttl",
            "0",
            "--cors-origin",
            "http://a.test",
            "--cors-origin",
            "http://b.test,http://c.test",
        ]);
        let settings = Settings::from_args(&args, Some(PathBuf::from("/data"))).unwrap();

        assert_eq!(settings.bind_address(), "0.0.0.0:9001");
        assert_eq!(settings.cache_ttl, Duration::ZERO);
        assert_eq!(
            settings.cors_origins,
            vec!["http://a.test", "http://b.test", "http://c.test"]
        );
        assert_eq!(settings.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(settings.data_loader().unwrap().root(), PathBuf::from("/data"));
    }

    #[test]
    fn test_rejects_invalid_port() {
        let argv = ["deckstat", "--port", "70000"];
        assert!(Harness::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_rejects_blank_host() {
        let args = parse(&["--host", " "]);
        assert!(matches!(
            Settings::from_args(&args, None),
            Err(DeckstatError::Config(_))
        ));
    }
}
