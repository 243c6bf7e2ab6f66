//! Building and running the `bcp` command line.
//!
//! The command is built from a [`LoaderConfig`] (server, authentication,
//! batching) plus the per-load target table and data files. Anything meant for
//! humans (`Display`, logs, [`LoadError`]) shows the password as `***`; only
//! the argument vector handed to the process carries it.
//!
//! ```
//! use bcpnative::loader::{Auth, BcpCommand, DataFormat, LoaderConfig};
//!
//! let config = LoaderConfig {
//!     server: "db.internal,1433".into(),
//!     auth: Some(Auth::SqlLogin { username: "etl".into(), password: "s3cret".into() }),
//!     ..Default::default()
//! };
//! let cmd = BcpCommand::new(
//!     "Sales.dbo.Orders",
//!     "batch.dat",
//!     DataFormat::Native { format_file: "batch.xml".into() },
//!     config,
//! );
//! let shown = cmd.to_string();
//! assert!(shown.contains("-P ***"));
//! assert!(!shown.contains("s3cret"));
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, error, info};

const REDACTED: &str = "***";

/// How `bcp` authenticates against the server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Auth {
    /// Integrated security (`-T`).
    Trusted,
    /// SQL Server login (`-U`/`-P`).
    SqlLogin { username: String, password: String },
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Trusted => f.write_str("Trusted"),
            Auth::SqlLogin { username, .. } => f
                .debug_struct("SqlLogin")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
        }
    }
}

/// Connection and batching settings shared by every load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Executable to run.
    pub program: PathBuf,
    /// Server and port, e.g. `MyServer,1433` (`-S`).
    pub server: String,
    /// Required; `None` fails before anything is spawned.
    pub auth: Option<Auth>,
    /// Rows per committed batch (`-b`).
    pub batch_size: usize,
    /// Rejected-row log (`-e`).
    pub error_log: PathBuf,
    /// First data row to load, 1-based (`-F`).
    pub first_row: usize,
    /// Trust the server certificate (`-u`).
    pub trust_server_certificate: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("bcp"),
            server: String::new(),
            auth: None,
            batch_size: 500_000,
            error_log: PathBuf::from("bcp_error.log"),
            first_row: 1,
            trust_server_certificate: true,
        }
    }
}

/// Layout of the data file being loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataFormat {
    /// Native payload described by an XML format file (`-f`).
    Native { format_file: PathBuf },
    /// Delimited character data (`-c -t <sep> -C <code page>`).
    Character { separator: u8, code_page: String },
}

/// A non-zero exit from `bcp`.
#[derive(Debug, Clone)]
pub struct LoadError {
    /// Command line with the password redacted.
    pub command: String,
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub error_log: PathBuf,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "bcp exited with status {}", code)?,
            None => write!(f, "bcp was terminated by a signal")?,
        }
        write!(f, ": {}", self.command)?;
        if !self.stderr.trim().is_empty() {
            write!(f, "\nstderr: {}", self.stderr.trim())?;
        }
        if !self.stdout.trim().is_empty() {
            write!(f, "\nstdout: {}", self.stdout.trim())?;
        }
        write!(f, "\ncheck the error file: {}", self.error_log.display())
    }
}

impl std::error::Error for LoadError {}

/// Captured output of a successful load.
#[derive(Debug, Clone, Default)]
pub struct LoadOutput {
    pub stdout: String,
    pub stderr: String,
}

/// One `bcp <table> in <file>` invocation.
#[derive(Clone, Debug)]
pub struct BcpCommand {
    pub table: String,
    pub data_file: PathBuf,
    pub format: DataFormat,
    pub config: LoaderConfig,
}

impl BcpCommand {
    pub fn new(
        table: impl Into<String>,
        data_file: impl Into<PathBuf>,
        format: DataFormat,
        config: LoaderConfig,
    ) -> Self {
        Self {
            table: table.into(),
            data_file: data_file.into(),
            format,
            config,
        }
    }

    fn auth_args(&self, redact: bool) -> Result<Vec<String>> {
        match &self.config.auth {
            Some(Auth::Trusted) => Ok(vec!["-T".to_string()]),
            Some(Auth::SqlLogin { username, password })
                if !username.is_empty() && !password.is_empty() =>
            {
                let password = if redact { REDACTED } else { password.as_str() };
                Ok(vec![
                    "-U".to_string(),
                    username.clone(),
                    "-P".to_string(),
                    password.to_string(),
                ])
            }
            _ => bail!(
                "authentication error: provide a trusted connection or both username and password"
            ),
        }
    }

    fn base_args(&self) -> Vec<String> {
        let c = &self.config;
        let mut args = vec![
            self.table.clone(),
            "in".to_string(),
            self.data_file.display().to_string(),
            "-S".to_string(),
            c.server.clone(),
        ];
        match &self.format {
            DataFormat::Native { format_file } => {
                args.push("-f".to_string());
                args.push(format_file.display().to_string());
            }
            DataFormat::Character { separator, .. } => {
                args.push("-c".to_string());
                args.push("-t".to_string());
                args.push(char::from(*separator).to_string());
            }
        }
        args.push("-F".to_string());
        args.push(c.first_row.to_string());
        if let DataFormat::Character { code_page, .. } = &self.format {
            args.push("-C".to_string());
            args.push(code_page.clone());
        }
        args.push("-b".to_string());
        args.push(c.batch_size.to_string());
        args.push("-e".to_string());
        args.push(c.error_log.display().to_string());
        if c.trust_server_certificate {
            args.push("-u".to_string());
        }
        args
    }

    /// Arguments passed to the process, credentials included.
    ///
    /// # Errors
    /// Fails when no usable authentication is configured.
    pub fn args(&self) -> Result<Vec<String>> {
        let mut args = self.base_args();
        args.extend(self.auth_args(false)?);
        Ok(args)
    }

    /// Arguments with the password replaced by `***`.
    ///
    /// # Errors
    /// Fails when no usable authentication is configured.
    pub fn redacted_args(&self) -> Result<Vec<String>> {
        let mut args = self.base_args();
        args.extend(self.auth_args(true)?);
        Ok(args)
    }

    /// Run `bcp` and wait for it.
    ///
    /// # Errors
    /// A configuration error before spawning, a "not found" error when the
    /// executable is missing, or a [`LoadError`] for a non-zero exit.
    pub fn run(&self) -> Result<LoadOutput> {
        let args = self.args()?;
        info!(table = %self.table, "executing bcp");
        debug!(command = %self, "running bcp (password redacted)");

        let output = match Command::new(&self.config.program).args(&args).output() {
            Ok(o) => o,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!(program = %self.config.program.display(), "bcp command not found");
                bail!(
                    "bcp command not found: is '{}' on PATH?",
                    self.config.program.display()
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("spawn {}", self));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            let failure = LoadError {
                command: self.to_string(),
                status: output.status.code(),
                stdout,
                stderr,
                error_log: self.config.error_log.clone(),
            };
            error!(
                status = ?failure.status,
                command = %failure.command,
                stderr = %failure.stderr.trim(),
                error_log = %failure.error_log.display(),
                "bcp failed"
            );
            return Err(failure.into());
        }

        info!(table = %self.table, "bcp completed successfully");
        debug!(stdout = %stdout.trim(), "bcp output");
        Ok(LoadOutput { stdout, stderr })
    }
}

impl fmt::Display for BcpCommand {
    /// The redacted command line; without usable auth the auth flags are omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .redacted_args()
            .unwrap_or_else(|_| self.base_args());
        write!(f, "{}", self.config.program.display())?;
        for a in args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}
