use crate::config::constants::COPY_BUFFER_SIZE;
use crate::pipeline::tee::tee_copy;
use crate::util::hash::Fingerprint;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{self, AsyncRead, AsyncWrite};
use tracing::debug;

/// Open `path` for reading, or stdin when no path is given
pub async fn open_input(path: Option<&Path>) -> io::Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(path) => {
            debug!("Reading input from {:?}", path);
            Ok(Box::new(File::open(path).await?))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

/// Open `path` for writing, or stdout when no path is given
pub async fn open_output(path: Option<&Path>) -> io::Result<Box<dyn AsyncWrite + Unpin + Send>> {
    match path {
        Some(path) => {
            debug!("Writing output to {:?}", path);
            Ok(Box::new(File::create(path).await?))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Copy the file at `src` into `dest`, returning the number of bytes copied
pub async fn copy_file_to<W>(src: &Path, dest: &mut W) -> io::Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut file = File::open(src).await?;
    let summary = tee_copy(&mut file, dest, COPY_BUFFER_SIZE).await?;
    Ok(summary.bytes)
}

/// SHA-256 fingerprint of a file's content
pub async fn fingerprint_file(path: &Path) -> io::Result<Fingerprint> {
    let mut file = File::open(path).await?;
    let summary = tee_copy(&mut file, &mut io::sink(), COPY_BUFFER_SIZE).await?;
    Ok(summary.fingerprint)
}
