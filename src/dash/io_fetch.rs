// Downloading the workbook, with a reuse window on the downloaded copy.

use crate::dash::*;

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

const DOWNLOAD_TIMEOUT_SECONDS: u64 = 60;

pub fn drive_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={}&export=download", file_id)
}

/// True if the file exists and was modified less than `ttl` ago.
pub fn is_fresh(path: &Path, ttl: Duration) -> bool {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age < ttl,
        // Modified in the future.
        Err(_) => true,
    }
}

fn download(url: &str, dest: &Path) -> BDashResult<()> {
    info!("Downloading {} to {:?}", url, dest);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECONDS))
        .build()
        .context(FetchSnafu { url })?;
    let resp = client.get(url).send().context(FetchSnafu { url })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Box::new(DashError::FetchStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }));
    }
    let bytes = resp.bytes().context(FetchSnafu { url })?;
    debug!("download: {} bytes", bytes.len());
    let path = dest.display().to_string();
    fs::write(dest, &bytes).context(WritingFileSnafu { path })?;
    Ok(())
}

/// Returns the path of a workbook ready to be read.
///
/// Local sources are used in place. Remote sources are downloaded to `output_file`,
/// unless that file is younger than `ttl`.
pub fn acquire(source: &WorkbookSource, output_file: &Path, ttl: Duration) -> BDashResult<PathBuf> {
    let url = match source {
        WorkbookSource::Local(p) => return Ok(p.clone()),
        WorkbookSource::Drive(id) => drive_url(id),
        WorkbookSource::Url(u) => u.clone(),
    };
    if is_fresh(output_file, ttl) {
        debug!("acquire: reusing {:?}", output_file);
        return Ok(output_file.to_path_buf());
    }
    download(&url, output_file)?;
    Ok(output_file.to_path_buf())
}
