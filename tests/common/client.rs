//! Test gateway client.
//!
//! Speaks the JSON-lines gateway protocol: one inbound message object per
//! line out, one reply object per line back.

#![allow(dead_code)]

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A reply line from the bot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reply {
    pub kind: String,
    pub channel_id: String,
    pub text: String,
}

/// A test gateway client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test bot.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send a raw line.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a group message.
    pub async fn group(&mut self, channel: &str, author: &str, text: &str) -> anyhow::Result<()> {
        let line = json!({
            "text": text,
            "channel_id": channel,
            "context": { "type": "group", "id": "guild-1" },
            "author_id": author,
        });
        self.send_raw(&line.to_string()).await
    }

    /// Send a direct message.
    pub async fn direct(&mut self, author: &str, text: &str) -> anyhow::Result<()> {
        let line = json!({
            "text": text,
            "channel_id": format!("dm-{author}"),
            "context": { "type": "direct" },
            "author_id": author,
        });
        self.send_raw(&line.to_string()).await
    }

    /// Receive a single reply.
    pub async fn recv(&mut self) -> anyhow::Result<Reply> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a reply with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Reply> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(read > 0, "connection closed");
        Ok(serde_json::from_str(line.trim_end())?)
    }

    /// Assert that nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_timeout(dur).await {
            Ok(reply) => anyhow::bail!("unexpected reply: {reply:?}"),
            Err(_) => Ok(()),
        }
    }
}
