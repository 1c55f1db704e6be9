//! CSV upload endpoints. Bytes are stored in the session untouched and
//! parsed again on every dashboard render.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use vizboard_common::{Notice, UploadedFile};

use crate::error::Result;
use crate::session::CurrentSession;
use crate::state::SharedState;

/// File name must end in `.csv` (any case).
pub fn is_csv_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Outcome of reading one multipart field.
enum Accepted {
    File(UploadedFile),
    Rejected(Notice),
}

/// Collect the named file fields. Parts with no file selected are skipped.
async fn read_files(multipart: &mut Multipart, wanted: &[&str]) -> Result<Vec<(String, Accepted)>> {
    let mut out = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else { continue };
        if !wanted.contains(&name.as_str()) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }
        if !is_csv_name(&file_name) {
            warn!(field = %name, file = %file_name, "Rejected non-CSV upload");
            out.push((
                name,
                Accepted::Rejected(Notice::error(format!("{file_name} is not a .csv file"))),
            ));
            continue;
        }
        info!(field = %name, file = %file_name, bytes = bytes.len(), "CSV uploaded");
        out.push((name, Accepted::File(UploadedFile::new(file_name, bytes.to_vec()))));
    }
    Ok(out)
}

pub async fn upload_static(
    State(state): State<SharedState>,
    current: CurrentSession,
    mut multipart: Multipart,
) -> Result<Response> {
    if !current.session.is_logged_in() {
        return Ok((current.jar, Redirect::to("/login")).into_response());
    }
    let files = read_files(&mut multipart, &["file"]).await?;
    state
        .sessions
        .update(current.id, |s| {
            for (_, accepted) in files {
                match accepted {
                    Accepted::File(f) => s.static_upload = Some(Arc::new(f)),
                    Accepted::Rejected(notice) => s.flash.push(notice),
                }
            }
        })
        .await;
    Ok((current.jar, Redirect::to("/dashboard?mode=static")).into_response())
}

pub async fn upload_dynamic(
    State(state): State<SharedState>,
    current: CurrentSession,
    mut multipart: Multipart,
) -> Result<Response> {
    if !current.session.is_logged_in() {
        return Ok((current.jar, Redirect::to("/login")).into_response());
    }
    let files = read_files(&mut multipart, &["file1", "file2"]).await?;
    state
        .sessions
        .update(current.id, |s| {
            for (field, accepted) in files {
                match accepted {
                    Accepted::File(f) if field == "file1" => s.first_upload = Some(Arc::new(f)),
                    Accepted::File(f) => s.second_upload = Some(Arc::new(f)),
                    Accepted::Rejected(notice) => s.flash.push(notice),
                }
            }
        })
        .await;
    Ok((current.jar, Redirect::to("/dashboard?mode=dynamic")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_extension_check() {
        assert!(is_csv_name("sales.csv"));
        assert!(is_csv_name("SALES.CSV"));
        assert!(!is_csv_name("sales.xlsx"));
        assert!(!is_csv_name("csv"));
        assert!(!is_csv_name(""));
    }
}
