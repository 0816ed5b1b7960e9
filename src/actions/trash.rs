//! Trash strategies.
//!
//! A [`TrashStrategy`] is resolved once from the configured [`TrashMethod`]
//! and then handed to the [`Deleter`](super::Deleter). Resolution for
//! [`TrashMethod::Auto`] prefers the `trash` crate and otherwise picks the
//! relocation native to the running OS. Permanent removal is only ever used
//! when explicitly configured.
//!
//! The relocation strategies shell out (`mv`, PowerShell) and every
//! subprocess is bounded by a timeout; an expired child is killed and the
//! attempt is reported as timed out.

use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::DeleteError;
use crate::config::ConfigError;

/// How often a running trash subprocess is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Configured disposal method.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TrashMethod {
    /// `trash` crate when supported, else the OS-native relocation
    #[default]
    Auto,
    /// `trash` crate (system recycle bin)
    Native,
    /// `mv` into `~/.Trash`
    Macos,
    /// PowerShell `SendToRecycleBin`
    Windows,
    /// `mv` into the freedesktop.org trash with a `.trashinfo` entry
    Xdg,
    /// Irreversible removal
    Permanent,
}

impl TrashMethod {
    /// All methods, in the order they are offered to users.
    pub const ALL: [TrashMethod; 6] = [
        TrashMethod::Auto,
        TrashMethod::Native,
        TrashMethod::Macos,
        TrashMethod::Windows,
        TrashMethod::Xdg,
        TrashMethod::Permanent,
    ];

    /// Lowercase name used in config files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Native => "native",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::Xdg => "xdg",
            Self::Permanent => "permanent",
        }
    }
}

impl std::fmt::Display for TrashMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for TrashMethod {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for TrashMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| {
                ConfigError::unknown_value("trash_method", s, Self::ALL.iter().map(|m| m.name()))
            })
    }
}

/// Errors raised while resolving a strategy.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    /// The user's home or data directory is unknown.
    #[error("cannot locate the home directory needed by the {0} trash")]
    NoHomeDirectory(&'static str),
}

/// Whether the `trash` crate has a backend for this target.
pub const NATIVE_SUPPORTED: bool = cfg!(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd",
));

/// A resolved disposal strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashStrategy {
    /// `trash::delete`
    Native,
    /// `mv` into a macOS trash directory
    MacTrash {
        /// Usually `~/.Trash`
        trash_dir: PathBuf,
    },
    /// PowerShell `Microsoft.VisualBasic` recycle bin call
    WindowsRecycleBin,
    /// `mv` into a freedesktop.org trash
    XdgTrash {
        /// Trash root holding `files/` and `info/`
        trash_root: PathBuf,
    },
    /// `std::fs::remove_file`
    Permanent,
}

impl TrashStrategy {
    /// Resolve a configured method for the running platform.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoHomeDirectory`] when a relocation strategy
    /// needs a home directory that cannot be determined.
    pub fn resolve(method: TrashMethod) -> Result<Self, ResolveError> {
        let strategy = match method {
            TrashMethod::Auto if NATIVE_SUPPORTED => Self::Native,
            TrashMethod::Auto => Self::platform_default()?,
            TrashMethod::Native => Self::Native,
            TrashMethod::Macos => Self::mac_default()?,
            TrashMethod::Windows => Self::WindowsRecycleBin,
            TrashMethod::Xdg => Self::xdg_default()?,
            TrashMethod::Permanent => Self::Permanent,
        };
        log::debug!("Resolved trash method '{}' to {}", method, strategy.describe());
        Ok(strategy)
    }

    /// The relocation native to `std::env::consts::OS`.
    ///
    /// # Errors
    ///
    /// See [`TrashStrategy::resolve`].
    pub fn platform_default() -> Result<Self, ResolveError> {
        match std::env::consts::OS {
            "macos" => Self::mac_default(),
            "windows" => Ok(Self::WindowsRecycleBin),
            _ => Self::xdg_default(),
        }
    }

    fn mac_default() -> Result<Self, ResolveError> {
        let dirs = BaseDirs::new().ok_or(ResolveError::NoHomeDirectory("macOS"))?;
        Ok(Self::MacTrash {
            trash_dir: dirs.home_dir().join(".Trash"),
        })
    }

    fn xdg_default() -> Result<Self, ResolveError> {
        let dirs = BaseDirs::new().ok_or(ResolveError::NoHomeDirectory("XDG"))?;
        Ok(Self::XdgTrash {
            trash_root: dirs.data_dir().join("Trash"),
        })
    }

    /// Whether removal through this strategy cannot be undone.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent)
    }

    /// Short label used in error messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Native => "trash",
            Self::MacTrash { .. } => "macOS trash",
            Self::WindowsRecycleBin => "Windows Recycle Bin",
            Self::XdgTrash { .. } => "XDG trash",
            Self::Permanent => "permanent delete",
        }
    }

    /// Human-readable description of the strategy.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Native => "system trash (cross-platform)".to_string(),
            Self::MacTrash { trash_dir } => format!("macOS native (mv to {})", trash_dir.display()),
            Self::WindowsRecycleBin => "Windows native (Recycle Bin)".to_string(),
            Self::XdgTrash { trash_root } => {
                format!("XDG native (mv to {})", trash_root.join("files").display())
            }
            Self::Permanent => "permanent deletion (not recoverable)".to_string(),
        }
    }

    /// Success message for one removed file.
    #[must_use]
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Native => "File sent to trash",
            Self::MacTrash { .. } => "File moved to macOS Trash",
            Self::WindowsRecycleBin => "File moved to Windows Recycle Bin",
            Self::XdgTrash { .. } => "File moved to XDG Trash",
            Self::Permanent => "File permanently deleted",
        }
    }

    /// Dispose of a regular file that is known to exist.
    pub(crate) fn dispose(&self, path: &Path, timeout: Duration) -> Result<(), DeleteError> {
        match self {
            Self::Native => trash::delete(path).map_err(|e| native_error(path, self.label(), e)),
            Self::MacTrash { trash_dir } => {
                if !trash_dir.is_dir() {
                    return Err(self.failed(path, "macOS Trash directory not found"));
                }
                let dest = unique_destination(trash_dir, path, None);
                run_with_timeout(mv_command(path, &dest), timeout, self.label(), path)
            }
            Self::WindowsRecycleBin => {
                run_with_timeout(recycle_bin_command(path), timeout, self.label(), path)
            }
            Self::XdgTrash { trash_root } => self.move_to_xdg(trash_root, path, timeout),
            Self::Permanent => fs::remove_file(path).map_err(|e| DeleteError::from_io(path, self.label(), e)),
        }
    }

    fn failed(&self, path: &Path, message: impl Into<String>) -> DeleteError {
        DeleteError::Failed {
            path: path.to_path_buf(),
            method: self.label().to_string(),
            message: message.into(),
        }
    }

    fn move_to_xdg(&self, trash_root: &Path, path: &Path, timeout: Duration) -> Result<(), DeleteError> {
        let files_dir = trash_root.join("files");
        if !files_dir.is_dir() {
            return Err(self.failed(path, "XDG Trash directory not found"));
        }
        let info_dir = trash_root.join("info");
        fs::create_dir_all(&info_dir).map_err(|e| DeleteError::from_io(path, self.label(), e))?;

        let dest = unique_destination(&files_dir, path, Some(&info_dir));
        let Some(name) = dest.file_name() else {
            return Err(self.failed(path, "cannot derive a trash file name"));
        };
        let info_path = info_dir.join(format!("{}.trashinfo", name.to_string_lossy()));

        // Reserve the name before moving
        let mut info = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&info_path)
            .map_err(|e| DeleteError::from_io(path, self.label(), e))?;
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let body = trash_info(&absolute, chrono::Local::now().naive_local());
        if let Err(e) = info.write_all(body.as_bytes()) {
            let _ = fs::remove_file(&info_path);
            return Err(DeleteError::from_io(path, self.label(), e));
        }
        drop(info);

        let moved = run_with_timeout(mv_command(path, &dest), timeout, self.label(), path);
        if moved.is_err() {
            let _ = fs::remove_file(&info_path);
        }
        moved
    }
}

/// Categorise a `trash` crate failure.
fn native_error(path: &Path, label: &str, error: trash::Error) -> DeleteError {
    match error {
        #[cfg(all(
            unix,
            not(target_os = "macos"),
            not(target_os = "ios"),
            not(target_os = "android")
        ))]
        trash::Error::FileSystem { source, .. } => DeleteError::from_io(path, label, source),
        trash::Error::CouldNotAccess { .. } => DeleteError::NotFound(path.to_path_buf()),
        trash::Error::Os { code, description } => {
            match DeleteError::from_io(path, label, std::io::Error::from_raw_os_error(code)) {
                DeleteError::Failed { .. } => DeleteError::Failed {
                    path: path.to_path_buf(),
                    method: label.to_string(),
                    message: format!("{} (os error {})", description, code),
                },
                categorised => categorised,
            }
        }
        other => DeleteError::Failed {
            path: path.to_path_buf(),
            method: label.to_string(),
            message: other.to_string(),
        },
    }
}

/// Categorise the stderr of a failed `mv` or PowerShell call.
fn stderr_error(path: &Path, label: &str, stderr: &str) -> Option<DeleteError> {
    const DENIED: [&str; 3] = ["Permission denied", "Operation not permitted", "Access is denied"];
    const MISSING: [&str; 2] = ["No such file", "Could not find"];

    if DENIED.iter().any(|m| stderr.contains(m)) {
        Some(DeleteError::PermissionDenied(path.to_path_buf()))
    } else if MISSING.iter().any(|m| stderr.contains(m)) {
        Some(DeleteError::NotFound(path.to_path_buf()))
    } else {
        log::trace!("{} stderr not categorised: {}", label, stderr);
        None
    }
}

fn mv_command(from: &Path, to: &Path) -> Command {
    let mut cmd = Command::new("mv");
    cmd.arg("--").arg(from).arg(to);
    cmd
}

fn recycle_bin_command(path: &Path) -> Command {
    let literal = path.to_string_lossy().replace('\'', "''");
    let script = format!(
        "Add-Type -AssemblyName Microsoft.VisualBasic; \
         [Microsoft.VisualBasic.FileIO.FileSystem]::DeleteFile('{}', 'OnlyErrorDialogs', 'SendToRecycleBin')",
        literal
    );
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
    cmd
}

/// Run a trash subprocess, killing it once `timeout` has elapsed.
fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
    path: &Path,
) -> Result<(), DeleteError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| DeleteError::from_io(path, label, e))?;
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr);
                }
                let stderr = stderr.trim();
                if let Some(err) = stderr_error(path, label, stderr) {
                    return Err(err);
                }
                let message = if stderr.is_empty() {
                    format!("exited with {}", status)
                } else {
                    stderr.to_string()
                };
                return Err(DeleteError::Failed {
                    path: path.to_path_buf(),
                    method: label.to_string(),
                    message,
                });
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                log::warn!("{} timed out after {:?}: {}", label, timeout, path.display());
                return Err(DeleteError::TimedOut {
                    path: path.to_path_buf(),
                    method: label.to_string(),
                    timeout,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(DeleteError::from_io(path, label, e));
            }
        }
    }
}

/// A name inside `dir` not yet taken by `dir` (nor by `info_dir` entries).
fn unique_destination(dir: &Path, path: &Path, info_dir: Option<&Path>) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().into_owned());
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx..].to_string()),
        _ => (name.clone(), String::new()),
    };

    let taken = |candidate: &str| {
        dir.join(candidate).symlink_metadata().is_ok()
            || info_dir.is_some_and(|info| info.join(format!("{}.trashinfo", candidate)).exists())
    };

    if !taken(&name) {
        return dir.join(name);
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{} {}{}", stem, n, ext);
        if !taken(&candidate) {
            return dir.join(candidate);
        }
        n += 1;
    }
}

/// Body of a freedesktop.org `.trashinfo` file.
fn trash_info(original: &Path, deleted_at: chrono::NaiveDateTime) -> String {
    format!(
        "[Trash Info]\nPath={}\nDeletionDate={}\n",
        percent_encode_path(original),
        deleted_at.format("%Y-%m-%dT%H:%M:%S")
    )
}

/// Percent-encode a path, keeping `/` and unreserved bytes.
pub(crate) fn percent_encode_path(path: &Path) -> String {
    let raw = path_bytes(path);
    let mut out = String::with_capacity(raw.len());
    for &byte in raw.iter() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Raw bytes of a path; lossy only where the OS has no byte view.
#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}
