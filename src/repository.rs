use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// A repository on disk, located at `<repos dir>/<username>/<name>`.
#[derive(Serialize)]
pub(crate) struct Repository {
    pub(crate) username: String,
    pub(crate) name: String,
    #[serde(skip)]
    pub(crate) path: PathBuf
}

#[derive(Serialize)]
pub(crate) struct RepoSummary {
    pub(crate) username: String,
    pub(crate) name: String,
    pub(crate) file_count: usize,
    pub(crate) size_in_bytes: u64,
    pub(crate) files: Vec<RepoFile>
}

/// A single top level entry of a repository, as shown in the detail view.
#[derive(Serialize)]
pub(crate) struct RepoFile {
    pub(crate) file_name: String,
    pub(crate) size_in_bytes: u64,
    pub(crate) directory: bool
}

impl Repository {
    /// Opens an existing repository. Returns `None` if it does not exist on disk.
    pub(crate) fn open(repos_dir: &Path, username: &str, name: &str) -> Option<Repository> {
        let path = repos_dir.join(username).join(name);

        if !path.is_dir() {
            return None;
        }

        Some(Repository {
            username: username.to_owned(),
            name: name.to_owned(),
            path
        })
    }

    /// Opens a repository, creating its directory first if this is the first upload to it.
    pub(crate) fn open_or_create(repos_dir: &Path, username: &str, name: &str) -> Result<Repository> {
        let path = repos_dir.join(username).join(name);

        if !path.is_dir() {
            fs::create_dir_all(path.as_path()).context("Unable to create repository directory")?;
        }

        Ok(Repository {
            username: username.to_owned(),
            name: name.to_owned(),
            path
        })
    }

    /// Builds the detail summary for this repository: top level listing plus
    /// recursive file count and total size.
    pub(crate) fn summarize(&self) -> Result<RepoSummary> {
        let mut files = Vec::<RepoFile>::new();

        for entry in fs::read_dir(self.path.as_path()).context("Unable to read repository directory")? {
            let entry = entry?;
            let meta_data = entry.metadata()?;

            files.push(RepoFile {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                size_in_bytes: if meta_data.is_dir() { 0 } else { meta_data.len() },
                directory: meta_data.is_dir()
            });
        }

        files.sort_by(|lhs, rhs| rhs.directory.cmp(&lhs.directory).then_with(|| lhs.file_name.cmp(&rhs.file_name)));

        let (file_count, size_in_bytes) = walk(self.path.as_path())?;

        Ok(RepoSummary {
            username: self.username.clone(),
            name: self.name.clone(),
            file_count,
            size_in_bytes,
            files
        })
    }
}

impl RepoSummary {
    /// Plain text rendering of the summary, used when the `txt` format suffix was negotiated.
    pub(crate) fn to_text(&self) -> String {
        let mut output = format!("{}/{}\n{} files, {} bytes\n", self.username, self.name, self.file_count, self.size_in_bytes);

        for file in &self.files {
            if file.directory {
                output.push_str(format!("{}/\n", file.file_name).as_str());
            } else {
                output.push_str(format!("{} ({} bytes)\n", file.file_name, file.size_in_bytes).as_str());
            }
        }

        output
    }
}

/// Recursively counts regular files and sums their sizes.
fn walk(path: &Path) -> Result<(usize, u64)> {
    let mut file_count = 0_usize;
    let mut size_in_bytes = 0_u64;

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let meta_data = entry.metadata()?;

        if meta_data.is_dir() {
            let (count, size) = walk(entry.path().as_path())?;

            file_count += count;
            size_in_bytes += size;
        } else {
            file_count += 1;
            size_in_bytes += meta_data.len();
        }
    }

    Ok((file_count, size_in_bytes))
}
