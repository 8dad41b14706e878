use chrono::{Days, NaiveDate};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::arxiv::{self, ArxivClient, PaperReference};
use crate::config::Config;
use crate::error::{DigestError, ExtractionError, FetchError};
use crate::pdf;
use crate::summarizer::{Summarizer, Summary};

/// A paper whose summary was written
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizedPaper {
    pub id: String,
    pub output: PathBuf,
}

/// A paper that was dropped, and the stage that dropped it
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPaper {
    pub id: String,
    pub stage: &'static str,
    pub error: String,
}

/// Outcome of one run. Both lists are sorted by paper id.
#[derive(Debug, Default)]
pub struct RunReport {
    pub discovered: usize,
    pub summarized: Vec<SummarizedPaper>,
    pub failed: Vec<FailedPaper>,
}

/// Everything one paper needs, shared read-only between tasks
#[derive(Debug)]
struct PaperWorker {
    fetcher: ArxivClient,
    summarizer: Summarizer,
    download_dir: PathBuf,
    processed_dir: PathBuf,
    output_dir: PathBuf,
}

/// Fetch → download → extract → summarize → persist, for every discovered paper
#[derive(Debug)]
pub struct Pipeline {
    worker: Arc<PaperWorker>,
    days: u32,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self, DigestError> {
        config.validate()?;
        let client = crate::http_client(config.request_timeout).map_err(FetchError::from)?;

        Ok(Self {
            worker: Arc::new(PaperWorker {
                fetcher: ArxivClient::new(config, client.clone()),
                summarizer: Summarizer::new(config, client),
                download_dir: config.download_dir.clone(),
                processed_dir: config.processed_dir.clone(),
                output_dir: config.output_dir.clone(),
            }),
            days: config.days,
            concurrency: config.concurrency,
        })
    }

    /// Run the whole pipeline once. Only directory setup and search errors abort the run;
    /// per-paper failures end up in the report.
    pub async fn run(&self, today: NaiveDate) -> Result<RunReport, DigestError> {
        self.prepare_dirs().await?;

        let cutoff = cutoff_date(today, self.days);
        let papers = self.worker.fetcher.fetch_papers(cutoff).await?;
        let report = self.process_all(papers).await;

        info!(
            "Done! {} discovered, {} summarized, {} failed",
            report.discovered,
            report.summarized.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Process papers with at most `concurrency` in flight, isolating failures per paper
    pub async fn process_all(&self, papers: Vec<PaperReference>) -> RunReport {
        let mut report = RunReport {
            discovered: papers.len(),
            ..RunReport::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut pending = BTreeSet::new();

        for paper in papers {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let worker = Arc::clone(&self.worker);
            pending.insert(paper.id.clone());
            tasks.spawn(async move {
                let _permit = permit;
                let result = worker.process(&paper).await;
                (paper.id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(output))) => {
                    pending.remove(&id);
                    report.summarized.push(SummarizedPaper { id, output });
                }
                Ok((id, Err(e))) => {
                    pending.remove(&id);
                    warn!("Paper {} failed during {}: {}", id, e.stage(), e);
                    report.failed.push(FailedPaper {
                        id,
                        stage: e.stage(),
                        error: e.to_string(),
                    });
                }
                Err(e) => warn!("Paper task did not complete: {}", e),
            }
        }

        // Tasks that panicked or were cancelled never reported their id
        for id in pending {
            report.failed.push(FailedPaper {
                id,
                stage: "task",
                error: "task did not complete".to_string(),
            });
        }

        report.summarized.sort_by(|a, b| a.id.cmp(&b.id));
        report.failed.sort_by(|a, b| a.id.cmp(&b.id));
        report
    }

    async fn prepare_dirs(&self) -> Result<(), DigestError> {
        for dir in [
            &self.worker.download_dir,
            &self.worker.processed_dir,
            &self.worker.output_dir,
        ] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| DigestError::Io {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

impl PaperWorker {
    async fn process(&self, paper: &PaperReference) -> Result<PathBuf, DigestError> {
        info!("Processing paper {}", paper.id);

        let bytes = self.fetcher.download_pdf(paper).await?;
        let pdf_path = arxiv::save_pdf(&self.download_dir, paper, &bytes).await?;

        let text = pdf::extract_text(bytes).await?;
        if text.is_empty() {
            return Err(ExtractionError::NoText.into());
        }
        debug!("Paper {} yielded {} characters of text", paper.id, text.char_count());

        let summary = self.summarizer.summarize(paper, &text).await?;
        let output = write_summary(&self.output_dir, paper, &summary)?;
        info!("Saved summary to: {:?}", output);

        let processed = self.processed_dir.join(format!("{}.pdf", paper.file_stem()));
        if let Err(e) = tokio::fs::rename(&pdf_path, &processed).await {
            warn!("Could not move {:?} to {:?}: {}", pdf_path, processed, e);
        }

        Ok(output)
    }
}

/// Earliest submission date still included in a run
pub fn cutoff_date(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Text written to a summary file
pub fn render_summary(paper: &PaperReference, summary: &Summary) -> String {
    format!(
        "Title: {}\narXiv ID: {}\nPDF: {}\nSubmitted: {}\n\n{}\n",
        paper.title.as_deref().unwrap_or("(untitled)"),
        paper.id,
        paper.pdf_url,
        paper.submitted.format("%Y-%m-%d"),
        summary.text
    )
}

/// Atomically write `<dir>/<id>.txt`
pub fn write_summary(dir: &Path, paper: &PaperReference, summary: &Summary) -> Result<PathBuf, DigestError> {
    let path = dir.join(format!("{}.txt", paper.file_stem()));

    let mut file = NamedTempFile::new_in(dir).map_err(|source| io_error(&path, source))?;
    file.write_all(render_summary(paper, summary).as_bytes())
        .map_err(|source| io_error(&path, source))?;
    file.persist(&path).map_err(|e| io_error(&path, e.error))?;

    Ok(path)
}

fn io_error(path: &Path, source: std::io::Error) -> DigestError {
    DigestError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    #[test]
    fn test_cutoff_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap();
        assert_eq!(cutoff_date(today, 7), NaiveDate::from_ymd_opt(2025, 2, 27).unwrap());
        assert_eq!(cutoff_date(today, 0), today);
        assert_eq!(cutoff_date(today, u32::MAX), NaiveDate::MIN);
    }

    #[test]
    fn test_write_summary_names_file_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let paper = PaperReference {
            id: "2503.03395".to_string(),
            title: Some("Some Title".to_string()),
            submitted: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            pdf_url: Url::parse("https://arxiv.org/pdf/2503.03395").unwrap(),
        };
        let summary = Summary {
            paper_id: paper.id.clone(),
            text: "Short summary.".to_string(),
        };

        let path = write_summary(dir.path(), &paper, &summary).unwrap();
        assert_eq!(path, dir.path().join("2503.03395.txt"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Title: Some Title\narXiv ID: 2503.03395\n"));
        assert!(content.contains("Submitted: 2025-03-04"));
        assert!(content.ends_with("Short summary.\n"));
    }
}
