use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    resource::StaticFile, response_writer::ResponseWriter, router::percent_decode,
    status::ReasonPhrase,
};

/// Answers a request that resolved to a static resource.
pub fn serve_static(w: &mut ResponseWriter, file: &StaticFile) {
    let path = Path::new(&file.root).join(percent_decode(&file.rest));
    let Ok(path) = build_path(&file.root, path) else {
        w.set_reason_phrase(ReasonPhrase::BadRequest);
        return;
    };
    info!("file path: {:?}", path);

    match fs::read(&path) {
        Ok(contents) => {
            w.set_reason_phrase(ReasonPhrase::OK);
            w.set_body(contents, file.content_type);
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            w.set_reason_phrase(ReasonPhrase::NotFound);
        }
        Err(err) => {
            error!("{:?}", err);
            w.set_reason_phrase(ReasonPhrase::InternalServerError);
        }
    }
}

#[derive(Error, Debug)]
#[error("invalid path")]
struct InvalidPath;

/// Cleans `path` and makes sure it stays below `root`.
fn build_path(root: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<PathBuf, InvalidPath> {
    let root = path_clean::clean(root.as_ref());
    let path = path_clean::clean(path.as_ref());

    if path == root || !path.starts_with(&root) {
        warn!("file path: {:?}", path);
        return Err(InvalidPath);
    }
    Ok(path)
}
