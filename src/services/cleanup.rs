use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};
use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;
use crate::{AudioError, Result};

const SECS_PER_HOUR: u64 = 3600;

/// One project directory as seen on disk right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub id: String,
    pub age_secs: u64,
    pub size_bytes: u64,
}

/// Deletes project directories under a fixed root.
///
/// Nothing is cached: every call lists the root again. An error removing one
/// project aborts the rest of a batch, and projects removed before the error
/// stay removed.
#[derive(Debug, Clone)]
pub struct RetentionService {
    projects_root: PathBuf,
}

impl RetentionService {
    pub fn new(projects_root: impl Into<PathBuf>) -> Self {
        Self {
            projects_root: projects_root.into(),
        }
    }

    pub fn projects_root(&self) -> &Path {
        &self.projects_root
    }

    pub fn project_exists(&self, project_id: &str) -> Result<bool> {
        let path = self.project_path(project_id)?;
        match fs::symlink_metadata(&path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AudioError::storage(&path, e)),
        }
    }

    /// Delete one project. A project that does not exist is not an error.
    pub fn delete_project(&self, project_id: &str) -> Result<()> {
        let path = self.project_path(project_id)?;
        match fs::symlink_metadata(&path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Project {} already absent", project_id);
                Ok(())
            }
            Err(e) => Err(AudioError::retention(&path, e)),
            Ok(meta) if meta.is_dir() => {
                remove_project_dir(&path)?;
                info!("Deleted project {}", project_id);
                Ok(())
            }
            Ok(_) => Err(AudioError::retention(
                &path,
                io::Error::new(ErrorKind::Other, "not a project directory"),
            )),
        }
    }

    /// Delete every project directory and return how many were removed.
    pub fn delete_all_projects(&self) -> Result<usize> {
        if !self.projects_root.exists() {
            return Ok(0);
        }

        let deleted = self.remove_each(self.project_dirs()?, remove_project_dir)?;
        info!("Deleted {} projects from {}", deleted, self.projects_root.display());
        Ok(deleted)
    }

    /// Delete projects whose age is at least `older_than_hours`.
    ///
    /// A non-positive threshold deletes nothing.
    pub fn delete_projects_older_than_hours(&self, older_than_hours: i64) -> Result<usize> {
        self.delete_projects_older_than_hours_at(older_than_hours, SystemTime::now())
    }

    /// Same as [`delete_projects_older_than_hours`](Self::delete_projects_older_than_hours)
    /// with ages measured against `now`.
    pub fn delete_projects_older_than_hours_at(&self, older_than_hours: i64, now: SystemTime) -> Result<usize> {
        if older_than_hours <= 0 {
            warn!("Refusing to delete projects with non-positive TTL {}h", older_than_hours);
            return Ok(0);
        }
        if !self.projects_root.exists() {
            return Ok(0);
        }

        // Overflowing thresholds are older than anything on disk.
        let Some(threshold) = (older_than_hours as u64)
            .checked_mul(SECS_PER_HOUR)
            .map(Duration::from_secs)
        else {
            return Ok(0);
        };

        let mut expired = Vec::new();
        for (project_id, path) in self.project_dirs()? {
            match modified_time(&path) {
                Ok(Some(modified)) if age_at(modified, now) >= threshold => expired.push((project_id, path)),
                Ok(_) => {}
                Err(e) => return Err(AudioError::retention(&path, e)),
            }
        }

        let deleted = self.remove_each(expired, remove_project_dir)?;

        info!(
            "Deleted {} projects older than {}h from {}",
            deleted,
            older_than_hours,
            self.projects_root.display()
        );
        Ok(deleted)
    }

    /// Current projects with their age and on-disk size, sorted by id.
    pub fn list_projects(&self) -> Result<Vec<ProjectInfo>> {
        if !self.projects_root.exists() {
            return Ok(Vec::new());
        }

        let now = SystemTime::now();
        let mut projects = Vec::new();
        for (id, path) in self.project_dirs()? {
            let Some(modified) = modified_time(&path).map_err(|e| AudioError::storage(&path, e))? else {
                continue;
            };
            projects.push(ProjectInfo {
                id,
                age_secs: age_at(modified, now).as_secs(),
                size_bytes: directory_size(&path),
            });
        }

        Ok(projects)
    }

    fn project_path(&self, project_id: &str) -> Result<PathBuf> {
        let mut components = Path::new(project_id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == project_id => {
                Ok(self.projects_root.join(project_id))
            }
            _ => Err(AudioError::InvalidProjectId(project_id.to_string())),
        }
    }

    /// Remove `dirs` in order, stopping at the first failure.
    fn remove_each<F>(&self, dirs: Vec<(String, PathBuf)>, mut remove: F) -> Result<usize>
    where
        F: FnMut(&Path) -> Result<bool>,
    {
        let mut deleted = 0;
        for (project_id, path) in dirs {
            if remove(&path)? {
                info!("Deleted project {}", project_id);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Immediate child directories of the root, sorted by name. Symlinks are not followed.
    fn project_dirs(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut dirs = Vec::new();
        for entry in WalkDir::new(&self.projects_root).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.projects_root).to_path_buf();
                AudioError::storage(path, io::Error::from(e))
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            dirs.push((id, entry.into_path()));
        }
        Ok(dirs)
    }
}

/// `None` when the path has already been removed.
fn modified_time(path: &Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => Ok(Some(modified)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn age_at(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Returns `false` when the directory was already gone.
fn remove_project_dir(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AudioError::retention(path, e)),
    }
}

fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
