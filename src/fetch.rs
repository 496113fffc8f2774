//! Download of the published workbook.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::{fs, path::Path};
use tracing::{info, warn};

/// Download `url` and save the response body verbatim to `dest`,
/// overwriting any existing file. One shot: no retry, no resume.
///
/// An HTML-looking `Content-Type` is only warned about here; the body is
/// still saved as-is. The parse stage rejects non-workbook bytes by
/// signature.
pub fn download_spreadsheet(client: &Client, url: &str, dest: impl AsRef<Path>) -> Result<()> {
    let dest = dest.as_ref();
    info!(url, dest = %dest.display(), "downloading workbook");

    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {}", url))?
        .error_for_status()
        .with_context(|| format!("fetching {}", url))?;

    if let Some(ct) = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        if ct.contains("text/html") {
            warn!(
                content_type = ct,
                "response looks like an HTML page, not a workbook"
            );
        }
    }

    let bytes = resp
        .bytes()
        .with_context(|| format!("reading response body from {}", url))?;
    fs::write(dest, &bytes).with_context(|| format!("writing {}", dest.display()))?;
    info!(bytes = bytes.len(), "workbook saved");
    Ok(())
}
