//! Test bot management.
//!
//! Spawns and manages blepbot instances for integration testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// A running bot process listening on a local port.
pub struct TestBot {
    child: Child,
    port: u16,
    data_dir: PathBuf,
}

impl TestBot {
    /// Spawn a bot with prefix `!` and the `dead` trigger scoped to `chat`.
    pub async fn spawn(data_dir: &Path) -> anyhow::Result<Self> {
        Self::spawn_with_env(data_dir, &[]).await
    }

    /// Spawn a bot with extra environment variables.
    pub async fn spawn_with_env(data_dir: &Path, env: &[(&str, &str)]) -> anyhow::Result<Self> {
        let port = free_port()?;
        let config_path = data_dir.join("config.toml");
        let config_content = format!(
            r#"
[bot]
prefix = "!"
name = "test-bot"

[gateway]
address = "127.0.0.1:{port}"

[storage]
data_dir = "{}"

[triggers]
dead_channels = ["chat"]
"#,
            data_dir.join("data").display()
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_blepbot"))
            .arg(&config_path)
            .envs(env.iter().copied())
            .env("RUST_LOG", "warn")
            .spawn()?;

        let bot = Self {
            child,
            port,
            data_dir: data_dir.to_path_buf(),
        };

        // Wait for the gateway to start listening
        bot.wait_until_ready().await?;

        Ok(bot)
    }

    /// Wait until the gateway is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Bot failed to start within 5 seconds")
    }

    /// Get the gateway address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Directory the stores are written to.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("data")
    }

    /// Create a new test client connected to this bot.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }

    /// Send SIGINT and wait for a clean exit.
    #[cfg(unix)]
    pub async fn interrupt(mut self) -> anyhow::Result<std::process::ExitStatus> {
        let status = Command::new("kill")
            .arg("-INT")
            .arg(self.child.id().to_string())
            .status()?;
        anyhow::ensure!(status.success(), "kill -INT failed");

        for _ in 0..50 {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Bot did not exit within 5 seconds of SIGINT")
    }
}

impl Drop for TestBot {
    fn drop(&mut self) {
        // Kill the bot process if it is still running
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Ask the OS for an unused local port.
fn free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
