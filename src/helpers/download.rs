use std::cmp::min;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Response};
use tracing::info;
use url::Url;

use crate::settings::Settings;

/// Stream `url` into `dest`, showing a progress bar when the server reports a
/// content length and a spinner otherwise.
///
/// The body is written to a sibling `.download` file and renamed into place,
/// so `dest` never holds a partial document.
pub async fn download_to(settings: &Settings, url: &Url, dest: &Path, show_progress: bool) -> Result<PathBuf> {
    let client = Client::builder()
        .user_agent(settings.user_agent())
        .timeout(settings.timeout())
        .build()?;

    let mut res = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = res.status();
    if !status.is_success() {
        bail!("HTTP {status} for {url}");
    }

    let pb = if !show_progress {
        ProgressBar::hidden()
    } else if let Some(total) = res.content_length() {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::with_template(
                "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
                 {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            )?
            .progress_chars("#>-"),
        );
        pb
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{msg}\n{spinner:.green} [{elapsed_precise}] {bytes}")?);
        pb
    };
    pb.set_message(format!("Downloading {url}"));

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }

    let tmp = dest.with_extension("download");
    let downloaded = match write_body(&mut res, &tmp, &pb).await {
        Ok(n) => n,
        Err(err) => {
            pb.abandon();
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
    };

    fs::rename(&tmp, dest).with_context(|| format!("move {} -> {}", tmp.display(), dest.display()))?;

    pb.finish_with_message(format!("Downloaded {url} to {}", dest.display()));
    info!(%url, dest = %dest.display(), bytes = downloaded, "download complete");

    Ok(dest.to_path_buf())
}

async fn write_body(res: &mut Response, tmp: &Path, pb: &ProgressBar) -> Result<u64> {
    let mut file = File::create(tmp).with_context(|| format!("create file {}", tmp.display()))?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = res.chunk().await.context("read response body")? {
        file.write_all(&chunk)
            .with_context(|| format!("write file {}", tmp.display()))?;
        downloaded += chunk.len() as u64;
        pb.set_position(pb.length().map_or(downloaded, |total| min(downloaded, total)));
    }

    Ok(downloaded)
}

/// File name to save `url` under: its last non-empty path segment.
pub fn default_file_name(url: &Url) -> String {
    url.path()
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("index.json")
        .to_string()
}
