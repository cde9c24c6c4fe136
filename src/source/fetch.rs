//! Getting the input file onto local disk.
//!
//! Download-if-missing, gzip decompression and line counting. Everything
//! here runs before the pipeline starts; any failure aborts the run.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, Result};
use crate::progress::Progress;

/// Where a URL's payload lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPaths {
    /// File the download is written to.
    pub download: PathBuf,
    /// Decompressed file the pipeline reads.
    pub data: PathBuf,
}

impl LocalPaths {
    pub fn is_compressed(&self) -> bool {
        self.download != self.data
    }
}

/// Derive local file names from the last path segment of `url`.
///
/// `https://host/a/Books.jsonl.gz` in `dir` downloads to
/// `dir/Books.jsonl.gz` and is read from `dir/Books.jsonl`.
pub fn local_paths(url: &str, dir: &Path) -> Result<LocalPaths> {
    let parsed = Url::parse(url).map_err(|e| Error::fetch(url, e.to_string()))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::fetch(url, "URL path has no file name"))?;

    let data_name = name.strip_suffix(".gz").unwrap_or(name);
    if data_name.is_empty() {
        return Err(Error::fetch(url, "URL file name is only an extension"));
    }

    Ok(LocalPaths {
        download: dir.join(name),
        data: dir.join(data_name),
    })
}

/// Return the local data file for `url`, downloading and decompressing it
/// first if it is not already in `dir`.
pub async fn ensure_local(url: &str, dir: &Path, progress: &dyn Progress) -> Result<PathBuf> {
    let paths = local_paths(url, dir)?;

    if tokio::fs::try_exists(&paths.data).await? {
        #[cfg(feature = "tracing")]
        tracing::info!(path = %paths.data.display(), "input already present, skipping download");
        return Ok(paths.data);
    }

    #[cfg(feature = "tracing")]
    tracing::info!(url, path = %paths.download.display(), "downloading");
    download(url, &paths.download, progress).await?;

    if paths.is_compressed() {
        #[cfg(feature = "tracing")]
        tracing::info!(path = %paths.download.display(), "decompressing");
        decompress_gzip(&paths.download, &paths.data).await?;
    }

    Ok(paths.data)
}

/// Stream `url` into `dest`, reporting bytes written to `progress`.
///
/// The body goes to `dest.part` first so an interrupted download never
/// looks complete.
pub async fn download(url: &str, dest: &Path, progress: &dyn Progress) -> Result<()> {
    let response = reqwest::get(url).await?.error_for_status()?;
    if let Some(len) = response.content_length() {
        progress.set_length(len);
    }

    let tmp = part_path(dest);
    let mut file = tokio::fs::File::create(&tmp).await?;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        progress.inc(chunk.len() as u64);
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, dest).await?;
    Ok(())
}

/// Gunzip `src` into `dest` on a blocking thread.
pub async fn decompress_gzip(src: &Path, dest: &Path) -> Result<()> {
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(&src)?));
        let tmp = part_path(&dest);
        let mut out = io::BufWriter::new(File::create(&tmp)?);
        io::copy(&mut decoder, &mut out)?;
        out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        std::fs::rename(&tmp, &dest)?;
        Ok(())
    })
    .await?
}

/// Count records in `path`: newline-terminated lines plus a final
/// unterminated one. Only used to size progress reporting.
pub async fn count_lines(path: &Path) -> Result<u64> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<u64> {
        let mut reader = File::open(&path)?;
        let mut buf = vec![0_u8; 64 * 1024];
        let mut count = 0_u64;
        let mut last = None;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            count += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
            last = Some(buf[n - 1]);
        }
        if matches!(last, Some(b) if b != b'\n') {
            count += 1;
        }
        Ok(count)
    })
    .await?
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
