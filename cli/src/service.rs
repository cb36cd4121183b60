// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Boot-time service registration (systemd / launchd / Windows Run key)

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use fleet_agent_core::domain::platform::{Autostart, PlatformError};
use fleet_agent_core::infrastructure::platform::PlatformCommand;

const SERVICE_NAME: &str = "fleet-agent";
const SERVICE_TEMPLATE: &str = include_str!("../templates/fleet-agent.service");
const PLIST_TEMPLATE: &str = include_str!("../templates/io.fleet.agent.plist");

pub const SYSTEMD_UNIT_PATH: &str = "/etc/systemd/system/fleet-agent.service";
pub const LAUNCHD_PLIST_PATH: &str = "/Library/LaunchDaemons/io.fleet.agent.plist";
pub const LAUNCHD_LABEL: &str = "io.fleet.agent";
pub const WINDOWS_RUN_KEY: &str = r"HKLM\Software\Microsoft\Windows\CurrentVersion\Run";
pub const WINDOWS_RUN_VALUE: &str = "FleetAgent";

/// Registers `fleet-agent run` to start at boot.
#[derive(Debug, Clone)]
pub struct ServiceAutostart {
    binary: PathBuf,
    config: Option<PathBuf>,
}

impl ServiceAutostart {
    pub fn new(binary: impl Into<PathBuf>, config: Option<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config,
        }
    }

    /// Autostart for the running executable.
    pub fn for_current_exe(config: Option<PathBuf>) -> Result<Self, PlatformError> {
        Ok(Self::new(std::env::current_exe()?, config))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments the service manager passes to the binary.
    pub fn run_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(config) = &self.config {
            args.push("--config".to_string());
            args.push(config.display().to_string());
        }
        args.push("run".to_string());
        args
    }

    pub fn systemd_unit(&self) -> String {
        let exec_start = std::iter::once(quote_exec_arg(&self.binary.display().to_string()))
            .chain(self.run_args().iter().map(|a| quote_exec_arg(a)))
            .collect::<Vec<_>>()
            .join(" ");

        SERVICE_TEMPLATE.replace("{{EXEC_START}}", &exec_start)
    }

    pub fn launchd_plist(&self) -> String {
        let arguments = std::iter::once(self.binary.display().to_string())
            .chain(self.run_args())
            .map(|a| format!("        <string>{}</string>", escape_xml(&a)))
            .collect::<Vec<_>>()
            .join("\n");

        PLIST_TEMPLATE.replace("{{PROGRAM_ARGUMENTS}}", &arguments)
    }

    /// `reg add` invocation that writes the Run key value.
    pub fn windows_run_command(&self) -> PlatformCommand {
        let mut data = format!("\"{}\"", self.binary.display());
        for arg in self.run_args() {
            if arg.contains(' ') {
                data.push_str(&format!(" \"{}\"", arg));
            } else {
                data.push(' ');
                data.push_str(&arg);
            }
        }

        PlatformCommand::new("reg")
            .arg("add")
            .arg(WINDOWS_RUN_KEY)
            .arg("/v")
            .arg(WINDOWS_RUN_VALUE)
            .arg("/t")
            .arg("REG_SZ")
            .arg("/d")
            .arg(data)
            .arg("/f")
    }

    /// Install the service definition and enable it. Returns the location
    /// written (file path or registry key).
    pub fn install(&self) -> Result<String, PlatformError> {
        if !self.binary.exists() {
            return Err(PlatformError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Binary not found: {}", self.binary.display()),
            )));
        }
        require_admin()?;

        #[cfg(target_os = "linux")]
        {
            self.install_systemd()
        }

        #[cfg(target_os = "macos")]
        {
            self.install_launchd()
        }

        #[cfg(windows)]
        {
            run(&self.windows_run_command())?;
            Ok(format!("{}\\{}", WINDOWS_RUN_KEY, WINDOWS_RUN_VALUE))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
        {
            Err(PlatformError::Unsupported(
                "service installation is supported on Linux, macOS and Windows".to_string(),
            ))
        }
    }

    pub fn uninstall(&self) -> Result<(), PlatformError> {
        require_admin()?;

        #[cfg(target_os = "linux")]
        {
            uninstall_systemd()
        }

        #[cfg(target_os = "macos")]
        {
            uninstall_launchd()
        }

        #[cfg(windows)]
        {
            run(&PlatformCommand::new("reg")
                .arg("delete")
                .arg(WINDOWS_RUN_KEY)
                .arg("/v")
                .arg(WINDOWS_RUN_VALUE)
                .arg("/f"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
        {
            Err(PlatformError::Unsupported(
                "service removal is supported on Linux, macOS and Windows".to_string(),
            ))
        }
    }

    #[cfg(target_os = "linux")]
    fn install_systemd(&self) -> Result<String, PlatformError> {
        let unit = self.systemd_unit();

        // Idempotent: startup registration rewrites nothing when unchanged.
        if std::fs::read_to_string(SYSTEMD_UNIT_PATH).ok().as_deref() == Some(unit.as_str()) {
            debug!(path = SYSTEMD_UNIT_PATH, "Systemd unit already up to date");
        } else {
            info!(path = SYSTEMD_UNIT_PATH, "Writing systemd unit");
            std::fs::write(SYSTEMD_UNIT_PATH, unit)?;
            run(&PlatformCommand::new("systemctl").arg("daemon-reload"))?;
        }

        run(&PlatformCommand::new("systemctl").arg("enable").arg(SERVICE_NAME))?;
        Ok(SYSTEMD_UNIT_PATH.to_string())
    }

    #[cfg(target_os = "macos")]
    fn install_launchd(&self) -> Result<String, PlatformError> {
        let plist = self.launchd_plist();

        if std::fs::read_to_string(LAUNCHD_PLIST_PATH).ok().as_deref() == Some(plist.as_str()) {
            debug!(path = LAUNCHD_PLIST_PATH, "LaunchDaemon plist already up to date");
            return Ok(LAUNCHD_PLIST_PATH.to_string());
        }

        info!(path = LAUNCHD_PLIST_PATH, "Writing LaunchDaemon plist");
        std::fs::write(LAUNCHD_PLIST_PATH, plist)?;
        run(&PlatformCommand::new("launchctl")
            .arg("load")
            .arg("-w")
            .arg(LAUNCHD_PLIST_PATH))?;
        Ok(LAUNCHD_PLIST_PATH.to_string())
    }
}

impl Autostart for ServiceAutostart {
    fn register(&self) -> Result<(), PlatformError> {
        let location = self.install()?;
        info!(location = %location, "Autostart registered");
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn uninstall_systemd() -> Result<(), PlatformError> {
    info!("Uninstalling systemd service");

    // Stop and disable; both fail harmlessly when the unit is not loaded
    let _ = run(&PlatformCommand::new("systemctl")
        .arg("disable")
        .arg("--now")
        .arg(SERVICE_NAME));

    if Path::new(SYSTEMD_UNIT_PATH).exists() {
        std::fs::remove_file(SYSTEMD_UNIT_PATH)?;
    }

    let _ = run(&PlatformCommand::new("systemctl").arg("daemon-reload"));
    Ok(())
}

#[cfg(target_os = "macos")]
fn uninstall_launchd() -> Result<(), PlatformError> {
    info!("Uninstalling LaunchDaemon");

    let _ = run(&PlatformCommand::new("launchctl")
        .arg("unload")
        .arg(LAUNCHD_PLIST_PATH));

    if Path::new(LAUNCHD_PLIST_PATH).exists() {
        std::fs::remove_file(LAUNCHD_PLIST_PATH)?;
    }
    Ok(())
}

#[cfg(unix)]
fn require_admin() -> Result<(), PlatformError> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    if unsafe { libc::geteuid() } != 0 {
        return Err(PlatformError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "service registration requires root privileges",
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn require_admin() -> Result<(), PlatformError> {
    // `reg add` under HKLM reports its own access-denied error
    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "macos", windows))]
fn run(command: &PlatformCommand) -> Result<(), PlatformError> {
    debug!(program = %command.program, args = ?command.args, "Running service command");

    let output = command
        .to_command()
        .output()
        .map_err(|source| PlatformError::Spawn {
            program: command.program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(PlatformError::CommandFailed {
            program: command.program.clone(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// systemd ExecStart quoting: wrap arguments containing whitespace or quotes.
fn quote_exec_arg(arg: &str) -> String {
    if arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
