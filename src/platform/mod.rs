//! Operating system specifics: shell dialect, output encoding and tool lookup.

use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;
use std::time::Duration;

use tokio::sync::OnceCell;

/// Operating system class the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// The platform of the running process, resolved once.
    pub fn current() -> Self {
        static CURRENT: OnceLock<Platform> = OnceLock::new();
        *CURRENT.get_or_init(|| {
            if cfg!(windows) {
                Self::Windows
            } else if cfg!(target_os = "macos") {
                Self::MacOs
            } else {
                Self::Linux
            }
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }

    pub fn shell(&self) -> Shell {
        match self {
            Self::Windows => Shell::Windows,
            Self::Linux | Self::MacOs => Shell::Posix,
        }
    }
}

/// Text encoding of a shell's captured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    /// Simplified Chinese code page used by `cmd.exe` (CP936).
    Gbk,
}

impl OutputEncoding {
    /// Decode captured bytes, substituting U+FFFD for malformed sequences.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Gbk => {
                let (text, _, _) = encoding_rs::GBK.decode(bytes);
                text.into_owned()
            }
        }
    }
}

/// Shell dialect used to invoke command strings.
///
/// `cmd.exe` receives the command inside double quotes; POSIX shells get it
/// inside single quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Windows,
    Posix,
}

impl Shell {
    /// Render the full shell invocation for `command`.
    pub fn wrap(&self, command: &str) -> String {
        match self {
            Self::Windows => format!("cmd.exe /c \"{}\"", command),
            Self::Posix => format!("/bin/bash -c '{}'", command.replace('\'', r"'\''")),
        }
    }

    /// Quote an executable path for the start of a command string.
    ///
    /// Programs without whitespace or quotes are returned unchanged.
    pub fn quote_program(&self, program: &str) -> String {
        if !program.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
            return program.to_string();
        }
        match self {
            Self::Windows => format!("\"{}\"", program),
            Self::Posix => format!("'{}'", program.replace('\'', r"'\''")),
        }
    }

    pub fn encoding(&self) -> OutputEncoding {
        match self {
            Self::Windows => OutputEncoding::Gbk,
            Self::Posix => OutputEncoding::Utf8,
        }
    }

    /// Build a process that runs `command` through this shell.
    ///
    /// This is the spawnable equivalent of [`Shell::wrap`]: arguments are
    /// handed to the shell without a second round of quoting.
    pub fn command(&self, command: &str) -> Command {
        match self {
            Self::Windows => windows_command(command),
            Self::Posix => {
                let mut cmd = Command::new("/bin/bash");
                cmd.arg("-c").arg(command);
                cmd
            }
        }
    }
}

#[cfg(windows)]
fn windows_command(command: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut cmd = Command::new("cmd.exe");
    cmd.raw_arg(format!("/c \"{}\"", command));
    cmd
}

#[cfg(not(windows))]
fn windows_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd.exe");
    cmd.arg("/c").arg(command);
    cmd
}

/// Result of looking up an executable on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLocation {
    Found(PathBuf),
    NotFound,
}

impl ToolLocation {
    /// The program to invoke: the resolved path, or `fallback` when the
    /// lookup came back empty.
    pub fn program_or(&self, fallback: &str) -> String {
        match self {
            Self::Found(path) => path.display().to_string(),
            Self::NotFound => fallback.to_string(),
        }
    }
}

/// Default bound on a single tool lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Platform facts shared by the generation pipeline.
#[derive(Debug)]
pub struct PlatformAdapter {
    platform: Platform,
    lookup_timeout: Duration,
    tool: OnceCell<ToolLocation>,
}

impl PlatformAdapter {
    pub fn new(lookup_timeout: Duration) -> Self {
        Self::with_platform(Platform::current(), lookup_timeout)
    }

    pub fn with_platform(platform: Platform, lookup_timeout: Duration) -> Self {
        Self {
            platform,
            lookup_timeout,
            tool: OnceCell::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn shell(&self) -> Shell {
        self.platform.shell()
    }

    pub fn output_encoding(&self) -> OutputEncoding {
        self.shell().encoding()
    }

    pub fn shell_invocation(&self, command: &str) -> String {
        self.shell().wrap(command)
    }

    /// Look up the generation tool on `PATH`.
    ///
    /// The first call decides the answer for the lifetime of the adapter; a
    /// lookup that errors or exceeds the timeout counts as not found.
    pub async fn locate_tool(&self, name: &str) -> ToolLocation {
        self.tool
            .get_or_init(|| discover(name.to_string(), self.lookup_timeout))
            .await
            .clone()
    }
}

impl Default for PlatformAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TIMEOUT)
    }
}

async fn discover(name: String, timeout: Duration) -> ToolLocation {
    let lookup = tokio::task::spawn_blocking({
        let name = name.clone();
        move || which::which(&name)
    });

    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(Ok(path))) => {
            tracing::info!("Found {} at {}", name, path.display());
            ToolLocation::Found(path)
        }
        Ok(Ok(Err(e))) => {
            tracing::warn!("{} not found on PATH: {}", name, e);
            ToolLocation::NotFound
        }
        Ok(Err(e)) => {
            tracing::warn!("Lookup of {} failed: {}", name, e);
            ToolLocation::NotFound
        }
        Err(_) => {
            tracing::warn!("Lookup of {} timed out after {:?}", name, timeout);
            ToolLocation::NotFound
        }
    }
}
