//! CSV export service
//!
//! Writes the listings of one task to `<output_dir>/<query>_jobs_<location>.csv`.
//! The file is rendered in memory and written in one async call, so a
//! re-run overwrites the previous file with the new content.

use async_trait::async_trait;
use jobscout_core::domain::job::JobId;
use jobscout_core::domain::listing::JobListing;
use jobscout_core::domain::task::Task;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Column order of every exported file
pub const HEADERS: [&str; 7] = [
    "Job title",
    "Company name",
    "Location",
    "Date",
    "Salary",
    "Posted via",
    "URL",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Service trait for persisting a task's listings
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Persists the listings of a finished task
    ///
    /// # Arguments
    /// * `job_id` - The remote job the listings came from
    /// * `task` - The task, which names the output
    /// * `listings` - The parsed listings, possibly empty
    ///
    /// # Returns
    /// The path of the written file
    async fn export(
        &self,
        job_id: &JobId,
        task: &Task,
        listings: &[JobListing],
    ) -> Result<PathBuf, ExportError>;
}

/// Exporter writing one CSV file per task into a directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    /// Creates a new CSV exporter
    ///
    /// # Arguments
    /// * `output_dir` - Created on first export if missing
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the file for `task` is written
    pub fn path_for(&self, task: &Task) -> PathBuf {
        self.output_dir.join(task.output_file_name())
    }
}

#[async_trait]
impl Exporter for CsvExporter {
    async fn export(
        &self,
        job_id: &JobId,
        task: &Task,
        listings: &[JobListing],
    ) -> Result<PathBuf, ExportError> {
        let contents = render_csv(listings)?;
        let path = self.path_for(task);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| ExportError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(
            "Wrote {} listing(s) of job {} to {}",
            listings.len(),
            job_id,
            path.display()
        );

        Ok(path)
    }
}

/// Renders listings as CSV with a header row
///
/// Missing fields become empty cells. The header is written even when there
/// are no listings.
pub fn render_csv(listings: &[JobListing]) -> Result<Vec<u8>, ExportError> {
    write_csv(Vec::new(), listings)
}

fn write_csv<W: io::Write>(sink: W, listings: &[JobListing]) -> Result<W, ExportError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(HEADERS)?;

    for listing in listings {
        writer.write_record([
            cell(&listing.job_title),
            cell(&listing.company_name),
            cell(&listing.location),
            cell(&listing.date),
            cell(&listing.salary),
            cell(&listing.posted_via),
            cell(&listing.url),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> JobListing {
        JobListing {
            job_title: Some("Dev".to_string()),
            company_name: Some("Acme".to_string()),
            location: Some("NY".to_string()),
            date: Some("1 day ago".to_string()),
            salary: Some("$100k".to_string()),
            posted_via: Some("LinkedIn".to_string()),
            url: Some("http://x".to_string()),
        }
    }

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_render_csv() {
        let csv = render_csv(&[sample_listing()]).unwrap();

        assert_eq!(
            lines(&csv),
            vec![
                "Job title,Company name,Location,Date,Salary,Posted via,URL",
                "Dev,Acme,NY,1 day ago,$100k,LinkedIn,http://x",
            ]
        );
    }

    #[test]
    fn test_render_csv_missing_fields_and_quoting() {
        let listing = JobListing {
            job_title: Some("Cook, Line".to_string()),
            location: Some("Austin, TX".to_string()),
            ..Default::default()
        };

        let csv = render_csv(&[listing]).unwrap();

        assert_eq!(lines(&csv)[1], r#""Cook, Line",,"Austin, TX",,,,"#);
    }

    #[derive(Debug)]
    struct FullDisk;

    impl io::Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_flush_failure_is_csv_error() {
        let err = write_csv(FullDisk, &[sample_listing()]).unwrap_err();

        assert!(matches!(err, ExportError::Csv(_)));
        let message = err.to_string();
        assert!(message.contains("disk full"));
        assert!(!message.contains("Failed to write"));
    }

    #[test]
    fn test_render_csv_without_listings_keeps_header() {
        let csv = render_csv(&[]).unwrap();
        assert_eq!(
            lines(&csv),
            vec!["Job title,Company name,Location,Date,Salary,Posted via,URL"]
        );
    }

    #[tokio::test]
    async fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let exporter = CsvExporter::new(dir.path().join("out"));
        let task = Task::new("developer", "com", "California,United States");

        let path = exporter
            .export(&JobId::new("1"), &task, &[sample_listing()])
            .await
            .unwrap();

        assert_eq!(
            path,
            dir.path()
                .join("out")
                .join("developer_jobs_California_United_States.csv")
        );
        let content = std::fs::read_to_string(&path).expect("should read file");
        assert!(content.contains("Dev,Acme,NY,1 day ago,$100k,LinkedIn,http://x"));
    }

    #[tokio::test]
    async fn test_export_twice_overwrites() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let exporter = CsvExporter::new(dir.path());
        let task = Task::new("developer", "com", "Ohio");

        let first = exporter
            .export(&JobId::new("1"), &task, &[sample_listing(), sample_listing()])
            .await
            .unwrap();
        let second = exporter
            .export(&JobId::new("2"), &task, &[sample_listing()])
            .await
            .unwrap();

        assert_eq!(first, second);
        let content = std::fs::read_to_string(&second).expect("should read file");
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_export_to_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").expect("should write file");

        let exporter = CsvExporter::new(&blocker);
        let err = exporter
            .export(&JobId::new("1"), &Task::new("chef", "com", "Ohio"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }));
    }
}
