use crate::cli::Cli;
use crate::error::FetchError;
use crate::pattern::Pattern;
use crate::types::{FileMode, Repository, VersionSelector};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Fully resolved inputs for one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub pattern: Pattern,
    pub repository: Repository,
    pub version: VersionSelector,
    pub tag_prefix: String,
    pub mode: FileMode,
    pub unpack: bool,
    pub token: String,
    pub out: Option<PathBuf>,
    pub workspace: PathBuf,
    pub api_url: String,
}

/// Process-wide values the command line may fall back to.
#[derive(Debug, Clone, Default)]
pub struct Ambient {
    pub repository: Option<String>,
    pub token: Option<String>,
    pub current_dir: Option<PathBuf>,
}

impl Ambient {
    pub fn from_env() -> Self {
        Ambient {
            repository: non_empty(env::var("GITHUB_REPOSITORY").ok()),
            token: non_empty(env::var("GITHUB_TOKEN").ok()),
            current_dir: env::current_dir().ok(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn resolve(cli: &Cli, ambient: &Ambient) -> Result<Config, FetchError> {
        let file = non_empty(cli.file.clone()).ok_or_else(|| {
            FetchError::Config("missing file name, use the 'file' input".to_string())
        })?;

        let token = non_empty(cli.token.clone())
            .or_else(|| ambient.token.clone())
            .ok_or_else(|| {
                FetchError::Config(
                    "missing auth token, either use the 'token' input or the GITHUB_TOKEN env var"
                        .to_string(),
                )
            })?;

        let repository = non_empty(cli.repo.clone())
            .or_else(|| ambient.repository.clone())
            .ok_or_else(|| {
                FetchError::Config(
                    "missing repository location, either use the 'repo' input or the GITHUB_REPOSITORY env var"
                        .to_string(),
                )
            })?
            .parse::<Repository>()
            .map_err(FetchError::Config)?;

        let pattern = Pattern::parse(&file);
        pattern
            .compile()
            .map_err(|e| FetchError::Config(format!("invalid file pattern '{}': {}", file, e)))?;

        let mode = cli.mode.parse::<FileMode>().map_err(FetchError::Config)?;

        let workspace = cli
            .workspace
            .clone()
            .filter(|w| !w.as_os_str().is_empty())
            .or_else(|| ambient.current_dir.clone())
            .ok_or_else(|| FetchError::Config("could not determine the workspace".to_string()))?;

        let api_url = match cli.api_url.trim_end_matches('/') {
            "" => DEFAULT_API_URL.to_string(),
            url => url.to_string(),
        };

        Ok(Config {
            pattern,
            repository,
            version: VersionSelector::parse(cli.release_version.trim()),
            tag_prefix: cli.prefix.clone(),
            mode,
            unpack: cli.unpack,
            token,
            out: cli.out.clone().filter(|o| !o.as_os_str().is_empty()),
            workspace,
            api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["ghasset"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn ambient() -> Ambient {
        Ambient {
            repository: Some("octo/ambient".to_string()),
            token: Some("ambient-token".to_string()),
            current_dir: Some(PathBuf::from("/work")),
        }
    }

    #[test]
    fn test_defaults_and_fallbacks() {
        let mut cli = parse(&["--file", "tool.zip"]);
        cli.workspace = None;
        cli.api_url = String::new();
        let config = Config::resolve(&cli, &ambient()).unwrap();

        assert_eq!(config.pattern, Pattern::Literal("tool.zip".to_string()));
        assert_eq!(config.repository.to_string(), "octo/ambient");
        assert_eq!(config.token, "ambient-token");
        assert_eq!(config.version, VersionSelector::Latest);
        assert_eq!(config.tag_prefix, "v");
        assert_eq!(config.mode.bits(), 0o644);
        assert!(!config.unpack);
        assert!(config.out.is_none());
        assert_eq!(config.workspace, PathBuf::from("/work"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_explicit_inputs_win() {
        let cli = parse(&[
            "--file",
            "/tool-.*/",
            "--repo",
            "octo/tool",
            "--token",
            "cli-token",
            "--version",
            "1.2.3",
            "--prefix",
            "release-",
            "--mode",
            "755",
            "--unpack",
            "--out",
            "bin",
            "--workspace",
            "/ws",
            "--api-url",
            "http://localhost:8080/",
        ]);
        let config = Config::resolve(&cli, &ambient()).unwrap();

        assert_eq!(config.pattern, Pattern::Regex("tool-.*".to_string()));
        assert_eq!(config.repository.to_string(), "octo/tool");
        assert_eq!(config.token, "cli-token");
        assert_eq!(config.version, VersionSelector::Exact("1.2.3".to_string()));
        assert_eq!(config.tag_prefix, "release-");
        assert_eq!(config.mode.bits(), 0o755);
        assert!(config.unpack);
        assert_eq!(config.out, Some(PathBuf::from("bin")));
        assert_eq!(config.workspace, PathBuf::from("/ws"));
        assert_eq!(config.api_url, "http://localhost:8080");
    }

    #[test]
    fn test_missing_token() {
        let cli = parse(&["--file", "tool.zip", "--repo", "octo/tool"]);
        let err = Config::resolve(&cli, &Ambient::default()).unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[test]
    fn test_missing_repository() {
        let cli = parse(&["--file", "tool.zip", "--token", "t"]);
        let err = Config::resolve(&cli, &Ambient::default()).unwrap_err();
        assert!(err.to_string().contains("GITHUB_REPOSITORY"));
    }

    #[test]
    fn test_invalid_inputs() {
        for args in [
            vec!["--file", "tool.zip", "--repo", "octo"],
            vec!["--file", "tool.zip", "--mode", "rw-r--r--"],
            vec!["--file", "/tool-(/"],
            vec!["--file", ""],
            vec![],
        ] {
            let err = Config::resolve(&parse(&args), &ambient()).unwrap_err();
            assert!(matches!(err, FetchError::Config(_)), "{:?}", args);
        }
    }
}
