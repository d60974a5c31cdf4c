use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Variables that would otherwise leak the host's GitHub Actions context into a test run
const AMBIENT_VARS: &[&str] = &[
    "GITHUB_REPOSITORY",
    "GITHUB_TOKEN",
    "GITHUB_WORKSPACE",
    "GITHUB_API_URL",
    "GITHUB_OUTPUT",
    "GITHUB_ACTIONS",
    "INPUT_FILE",
    "INPUT_REPO",
    "INPUT_VERSION",
    "INPUT_PREFIX",
    "INPUT_MODE",
    "INPUT_UNPACK",
    "INPUT_OUT",
    "INPUT_TOKEN",
    "RUST_LOG",
];

#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub workspace: PathBuf,
    pub output_file: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = temp_dir.path().join("workspace");
        std::fs::create_dir_all(&workspace).expect("Failed to create workspace");
        let output_file = temp_dir.path().join("github_output");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_ghasset"));

        Self {
            _temp_dir: temp_dir,
            workspace,
            output_file,
            bin_path,
        }
    }

    /// A command isolated from the host environment, rooted in the temp workspace
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        for var in AMBIENT_VARS {
            cmd.env_remove(var);
        }
        cmd.env("GITHUB_WORKSPACE", &self.workspace);
        cmd.env("GITHUB_OUTPUT", &self.output_file);
        cmd
    }

    pub fn workspace_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.workspace.join(name)
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert_eq!(
            self.status.code(),
            Some(1),
            "Expected exit code 1\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
