//! OS process-launch collaborators.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Seam for the OS-level launch primitives the catalog actions use.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppLauncher: Send + Sync {
    /// Launch a command as a fully detached background process: no stdin,
    /// output discarded, survives plugin exit.
    async fn launch_detached(&self, command: &str) -> io::Result<()>;

    /// Open a path via the OS's generic "open" mechanism.
    async fn open_path(&self, path: &Path) -> io::Result<()>;
}

/// The real launcher.
pub struct SystemLauncher;

#[async_trait]
impl AppLauncher for SystemLauncher {
    async fn launch_detached(&self, command: &str) -> io::Result<()> {
        // nohup + backgrounding keeps the application alive after the
        // plugin process exits.
        let status = Command::new("sh")
            .arg("-c")
            .arg(format!("nohup {command} </dev/null >/dev/null 2>&1 &"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?
            .wait()
            .await?;

        if !status.success() {
            return Err(io::Error::other(format!("launch shell exited with {status}")));
        }
        Ok(())
    }

    async fn open_path(&self, path: &Path) -> io::Result<()> {
        Command::new("open")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}
