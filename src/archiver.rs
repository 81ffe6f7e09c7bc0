use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use crate::error::ArchiverError;
use crate::search::{ArchiveResult, Archiver};
use crate::verbose;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFamily {
    WinRar,
    SevenZip,
    Zpaq,
}

/// The supported archiver/container combinations, matching the tools ad
/// portals commonly accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveProfile {
    WinrarZip,
    WinrarRar,
    SevenzipSevenz,
    SevenzipZip,
    ZpaqZpaq,
}

impl ArchiveProfile {
    pub const ALL: [ArchiveProfile; 5] = [
        ArchiveProfile::WinrarZip,
        ArchiveProfile::WinrarRar,
        ArchiveProfile::SevenzipSevenz,
        ArchiveProfile::SevenzipZip,
        ArchiveProfile::ZpaqZpaq,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArchiveProfile::WinrarZip => "winrar_zip",
            ArchiveProfile::WinrarRar => "winrar_rar",
            ArchiveProfile::SevenzipSevenz => "7zip_7z",
            ArchiveProfile::SevenzipZip => "7zip_zip",
            ArchiveProfile::ZpaqZpaq => "zpaq_zpaq",
        }
    }

    pub fn tool_family(&self) -> ToolFamily {
        match self {
            ArchiveProfile::WinrarZip | ArchiveProfile::WinrarRar => ToolFamily::WinRar,
            ArchiveProfile::SevenzipSevenz | ArchiveProfile::SevenzipZip => ToolFamily::SevenZip,
            ArchiveProfile::ZpaqZpaq => ToolFamily::Zpaq,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveProfile::WinrarZip | ArchiveProfile::SevenzipZip => ".zip",
            ArchiveProfile::WinrarRar => ".rar",
            ArchiveProfile::SevenzipSevenz => ".7z",
            ArchiveProfile::ZpaqZpaq => ".zpaq",
        }
    }

    /// Base compression switches handed to the tool on every invocation.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            ArchiveProfile::WinrarZip => &["-m5", "-afzip"],
            ArchiveProfile::WinrarRar => &["-m5", "-ma5", "-rr5p"],
            ArchiveProfile::SevenzipSevenz => &["-mx=9", "-t7z"],
            ArchiveProfile::SevenzipZip => &["-mx=9", "-tzip"],
            ArchiveProfile::ZpaqZpaq => &["-m5"],
        }
    }

    pub fn default_executable(&self) -> &'static str {
        match self.tool_family() {
            ToolFamily::WinRar => "rar",
            ToolFamily::SevenZip => "7z",
            ToolFamily::Zpaq => "zpaq",
        }
    }
}

impl FromStr for ArchiveProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArchiveProfile::ALL
            .iter()
            .find(|p| p.name() == s)
            .copied()
            .ok_or_else(|| {
                let names: Vec<_> = ArchiveProfile::ALL.iter().map(|p| p.name()).collect();
                format!("unknown profile '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

impl std::fmt::Display for ArchiveProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// [`Archiver`] adapter that shells out to the external tool selected by the
/// profile: WinRAR and 7-Zip run from inside the working copy and archive
/// its contents, zpaq runs from the parent directory and archives the copy
/// by name. Exclusion patterns are translated to each tool's own syntax.
#[derive(Debug, Clone)]
pub struct CommandArchiver {
    profile: ArchiveProfile,
    executable: PathBuf,
}

impl CommandArchiver {
    pub fn new(profile: ArchiveProfile, executable: PathBuf) -> Self {
        Self {
            profile,
            executable,
        }
    }

    pub fn with_default_executable(profile: ArchiveProfile) -> Self {
        Self::new(profile, PathBuf::from(profile.default_executable()))
    }

    pub fn profile(&self) -> ArchiveProfile {
        self.profile
    }

    fn command(
        &self,
        working_dir: &Path,
        output_abs: &Path,
        exclusions: &[String],
    ) -> Result<Command, ArchiverError> {
        let mut cmd = Command::new(&self.executable);
        match self.profile.tool_family() {
            ToolFamily::WinRar => {
                cmd.current_dir(working_dir);
                cmd.args(["a", "-r", "-ep1", "-ibck", "-y"]);
                cmd.args(self.profile.params());
                for pattern in exclusions {
                    cmd.arg(format!("-x{pattern}"));
                }
                cmd.arg(output_abs);
                cmd.arg(".");
            }
            ToolFamily::SevenZip => {
                cmd.current_dir(working_dir);
                cmd.args(["a", "-y", "-r"]);
                cmd.args(self.profile.params());
                cmd.arg(output_abs);
                for pattern in exclusions {
                    cmd.arg(format!("-x!{pattern}"));
                }
                cmd.arg("*");
            }
            ToolFamily::Zpaq => {
                let parent = working_dir.parent().unwrap_or_else(|| Path::new("."));
                let name = working_dir.file_name().ok_or_else(|| {
                    ArchiverError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("working dir has no name: {}", working_dir.display()),
                    ))
                })?;
                cmd.current_dir(parent);
                cmd.arg("a");
                cmd.arg(output_abs);
                cmd.arg(name);
                cmd.args(self.profile.params());
                for pattern in exclusions {
                    cmd.args(["-not", pattern]);
                }
                cmd.arg("-quiet");
            }
        }
        Ok(cmd)
    }
}

impl Archiver for CommandArchiver {
    fn build(
        &self,
        working_dir: &Path,
        output_path: &Path,
        exclusions: &[String],
    ) -> Result<ArchiveResult, ArchiverError> {
        // Tools run with a changed cwd, so the output path must be absolute.
        let output_abs = if output_path.is_absolute() {
            output_path.to_path_buf()
        } else {
            env::current_dir()?.join(output_path)
        };
        // 'a' appends into an existing archive; start clean instead.
        match fs::remove_file(&output_abs) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ArchiverError::Io(e)),
        }

        let mut cmd = self.command(working_dir, &output_abs, exclusions)?;
        verbose!("running {} ({})", self.executable.display(), self.profile);
        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ArchiverError::ToolNotFound(self.executable.clone())
            } else {
                ArchiverError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ArchiverError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                message,
            });
        }

        let metadata = fs::metadata(&output_abs)
            .map_err(|_| ArchiverError::OutputMissing(output_abs.clone()))?;
        Ok(ArchiveResult {
            size_kb: metadata.len() as f64 / 1024.0,
        })
    }
}
