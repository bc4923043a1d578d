use crate::util::hash::Fingerprint;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Bytes copied through a tee and their fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeeSummary {
    pub bytes: u64,
    pub fingerprint: Fingerprint,
}

/// Copy `reader` into `writer` while hashing every byte that passes.
///
/// The writer is flushed and shut down once the reader reaches EOF, so a pipe
/// sink signals end-of-input to its reader.
pub async fn tee_copy<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
) -> std::io::Result<TeeSummary>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut bytes = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        writer.write_all(&buf[..n]).await?;
        bytes += n as u64;
    }

    writer.flush().await?;
    writer.shutdown().await?;

    Ok(TeeSummary {
        bytes,
        fingerprint: Fingerprint::from_hasher(hasher),
    })
}
