//! Test relay client.
//!
//! A line-oriented client for integration testing that can send commands
//! and assert on received reply lines.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A test relay client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        let (read_half, write_half) = stream.into_split();
        let reader = BufReader::new(read_half);
        let writer = BufWriter::new(write_half);

        Ok(Self { reader, writer })
    }

    /// Send one line, appending the newline terminator.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line from the server.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a line with a timeout. Fails on timeout or a closed stream.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed by server");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Send a `broadcast` command.
    #[allow(dead_code)]
    pub async fn broadcast(&mut self, text: &str) -> anyhow::Result<()> {
        self.send_line(&format!("broadcast: {text}")).await
    }

    /// Send a `nick` command.
    #[allow(dead_code)]
    pub async fn nick(&mut self, name: &str) -> anyhow::Result<()> {
        self.send_line(&format!("nick: {name}")).await
    }

    /// Send a `quit` command.
    #[allow(dead_code)]
    pub async fn quit(&mut self) -> anyhow::Result<()> {
        self.send_line("quit:").await
    }
}
