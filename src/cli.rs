use clap::Parser;
use std::path::PathBuf;

pub fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // Tagged builds report the tag alone
    if let Some(tag) = option_env!("GHASSET_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("GHASSET_GIT_COMMIT").unwrap_or("unknown");

    // Leaked once at startup
    let version = format!("v{}-{}", BASE_VERSION, commit);
    Box::leak(version.into_boxed_str())
}

// Every input can also be supplied the way GitHub Actions passes step
// inputs (`INPUT_<NAME>`). `--version` selects the release, so the program
// version is only logged at debug level.
#[derive(Parser, Debug)]
#[command(name = "ghasset")]
#[command(about = "Fetch a single asset from a GitHub Release")]
#[command(version = get_version(), disable_version_flag = true)]
#[command(
    after_help = "Examples:\n  ghasset --repo cli/cli --file gh_2.40.0_linux_amd64.tar.gz --version 2.40.0\n  ghasset --repo nektos/act --file '/act_Linux_x86_64\\.tar\\.gz/' --unpack --out bin/"
)]
pub struct Cli {
    /// Asset file name, or a regular expression wrapped in slashes (e.g. '/tool-.*\.zip/')
    #[arg(long, env = "INPUT_FILE")]
    pub file: Option<String>,

    /// GitHub repository as 'owner/name' [fallback: GITHUB_REPOSITORY]
    #[arg(long, env = "INPUT_REPO")]
    pub repo: Option<String>,

    /// Release version to fetch, or 'latest'
    #[arg(long = "version", env = "INPUT_VERSION", default_value = "latest")]
    pub release_version: String,

    /// Prefix in front of the version in release tags
    #[arg(long, env = "INPUT_PREFIX", default_value = "v")]
    pub prefix: String,

    /// Octal permission mode of the downloaded file
    #[arg(long, env = "INPUT_MODE", default_value = "644")]
    pub mode: String,

    /// Unpack .zip, .tgz, .tbz, .gz and .bz assets next to the download
    #[arg(long, env = "INPUT_UNPACK")]
    pub unpack: bool,

    /// Destination file or directory, relative to the workspace
    #[arg(long, env = "INPUT_OUT")]
    pub out: Option<PathBuf>,

    /// GitHub token [fallback: GITHUB_TOKEN]
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base directory for relative output paths [default: current directory]
    #[arg(long, env = "GITHUB_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// GitHub API endpoint
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// File that receives the step outputs as 'key=value' lines
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output_file: Option<PathBuf>,

    /// Emit GitHub Actions workflow commands for warnings and errors
    #[arg(long, env = "GITHUB_ACTIONS")]
    pub annotate: bool,

    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,
}
