//! File-to-socket body transfer.
//!
//! Two strategies share one entry point: the kernel `sendfile` path on
//! Linux/Android and a portable read/write loop everywhere. Both move
//! exactly `len` bytes or stop early if the file turns out shorter.

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::config::TransferMode;

/// Bytes handed to one `sendfile` call.
#[cfg(any(target_os = "linux", target_os = "android"))]
const SENDFILE_CHUNK: u64 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Kernel copy, never enters userspace
    SendFile,
    /// `tokio::io::copy` through a userspace buffer
    CopyLoop,
}

impl Transfer {
    /// Whether this build can use `sendfile`.
    pub const fn zero_copy_supported() -> bool {
        cfg!(any(target_os = "linux", target_os = "android"))
    }

    /// Picks the strategy for a configured mode.
    pub fn select(mode: TransferMode) -> Self {
        match mode {
            TransferMode::Copy => Transfer::CopyLoop,
            TransferMode::Auto if Self::zero_copy_supported() => Transfer::SendFile,
            TransferMode::Auto => Transfer::CopyLoop,
            TransferMode::Sendfile if Self::zero_copy_supported() => Transfer::SendFile,
            TransferMode::Sendfile => {
                tracing::warn!("sendfile is not available on this platform, using copy loop");
                Transfer::CopyLoop
            }
        }
    }

    /// Sends up to `len` bytes of `file`, from its start, to `stream`.
    ///
    /// Returns the number of bytes actually sent.
    pub async fn send(
        self,
        file: &mut File,
        len: u64,
        stream: &mut TcpStream,
    ) -> std::io::Result<u64> {
        match self {
            Transfer::SendFile => send_file(file, len, stream).await,
            Transfer::CopyLoop => copy_loop(file, len, stream).await,
        }
    }
}

async fn copy_loop(file: &mut File, len: u64, stream: &mut TcpStream) -> std::io::Result<u64> {
    let mut body = file.take(len);
    tokio::io::copy(&mut body, stream).await
}

#[cfg(any(target_os = "linux", target_os = "android"))]
async fn send_file(file: &mut File, len: u64, stream: &mut TcpStream) -> std::io::Result<u64> {
    use nix::libc::off_t;
    use nix::sys::sendfile::sendfile;
    use tokio::io::Interest;

    let socket: &TcpStream = stream;
    let file: &File = file;
    let mut offset: off_t = 0;
    let mut sent: u64 = 0;

    while sent < len {
        let chunk = (len - sent).min(SENDFILE_CHUNK) as usize;

        socket.writable().await?;
        let result = socket.try_io(Interest::WRITABLE, || {
            sendfile(socket, file, Some(&mut offset), chunk).map_err(std::io::Error::from)
        });

        match result {
            // File shrank since its size was read
            Ok(0) => break,
            Ok(n) => sent += n as u64,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(sent)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
async fn send_file(file: &mut File, len: u64, stream: &mut TcpStream) -> std::io::Result<u64> {
    copy_loop(file, len, stream).await
}
