//! Method handlers
//!
//! One async handler per supported verb. Each resolves the request path against the
//! root first, so a traversal attempt fails before the filesystem is consulted.

use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use std::io;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::dispatch::{HandlerResult, RequestBody};
use super::resolver::RootDir;
use crate::error::RequestError;
use crate::http::{mime, ResponseDescriptor};

/// GET: stream a file, or list a directory's entries one per line
pub async fn get(req: Request<RequestBody>, root: &RootDir) -> HandlerResult {
    let path = root.resolve(req.uri())?;

    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(RequestError::NotFound),
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        let listing = list_directory(&path).await?;
        return Ok(ResponseDescriptor::text(StatusCode::OK, listing));
    }

    let file = File::open(&path).await?;
    debug!(path = %path.display(), size = metadata.len(), "streaming file");
    Ok(ResponseDescriptor::file(file, mime::content_type_for(&path)))
}

/// Entry names in the order the filesystem yields them
async fn list_directory(path: &Path) -> io::Result<String> {
    let mut entries = fs::read_dir(path).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names.join("\n"))
}

/// DELETE: remove a file or an empty directory. A missing entry counts as deleted.
pub async fn delete(req: Request<RequestBody>, root: &RootDir) -> HandlerResult {
    let path = root.resolve(req.uri())?;

    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(ResponseDescriptor::no_content())
        }
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        fs::remove_dir(&path).await?;
    } else {
        fs::remove_file(&path).await?;
    }
    Ok(ResponseDescriptor::no_content())
}

/// PUT: create or truncate the file and copy the request body into it
pub async fn put(req: Request<RequestBody>, root: &RootDir) -> HandlerResult {
    let path = root.resolve(req.uri())?;
    let mut body = req.into_body();

    let mut file = File::create(&path).await?;
    let mut written: u64 = 0;

    // One frame in flight at a time; the next is pulled only after the write lands.
    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                // The prefix already received stays on disk
                file.flush().await?;
                return Err(RequestError::from_body_error(e));
            }
        };
        if let Ok(data) = frame.into_data() {
            file.write_all(&data).await?;
            written += data.len() as u64;
        }
    }
    file.flush().await?;

    debug!(path = %path.display(), bytes = written, "upload complete");
    Ok(ResponseDescriptor::no_content())
}

/// MKCOL: create one directory; the parent must already exist
pub async fn mkcol(req: Request<RequestBody>, root: &RootDir) -> HandlerResult {
    let path = root.resolve(req.uri())?;
    fs::create_dir(&path).await?;
    Ok(ResponseDescriptor::no_content())
}
