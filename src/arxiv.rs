pub mod parser;

use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::{Client, Url};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::FetchError;
pub use parser::SearchResult;

/// A paper discovered through the search page
#[derive(Debug, Clone, PartialEq)]
pub struct PaperReference {
    pub id: String,
    pub title: Option<String>,
    pub submitted: NaiveDate,
    pub pdf_url: Url,
}

impl PaperReference {
    /// Identifier made safe for use as a file name
    pub fn file_stem(&self) -> String {
        self.id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect()
    }
}

/// Client for the arXiv search pages and PDF downloads
#[derive(Debug, Clone)]
pub struct ArxivClient {
    client: Client,
    search_url: Url,
    pages: usize,
    page_size: usize,
}

impl ArxivClient {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            search_url: config.search_url.clone(),
            pages: config.pages,
            page_size: config.page_size,
        }
    }

    /// Search URL with its `start` parameter set to `offset`
    pub fn page_url(&self, offset: usize) -> Url {
        let mut url = self.search_url.clone();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "start")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair("start", &offset.to_string());
        url
    }

    /// Fetch and parse one page of search results
    pub async fn fetch_page(&self, offset: usize) -> Result<Vec<SearchResult>, FetchError> {
        let url = self.page_url(offset);
        info!("Fetching page: {}", url);
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await?;
        let results = parser::parse_search_page(&html, &url);
        info!("Found {} results on this page.", results.len());
        Ok(results)
    }

    /// Walk the configured result pages and collect papers submitted on or after `cutoff`
    pub async fn fetch_papers(&self, cutoff: NaiveDate) -> Result<Vec<PaperReference>, FetchError> {
        let mut seen = HashSet::new();
        let mut papers = Vec::new();

        for page in 0..self.pages {
            let results = self.fetch_page(page * self.page_size).await?;
            let raw_count = results.len();
            papers.extend(select_papers(results, cutoff, &mut seen));

            if raw_count < self.page_size {
                debug!("Page {} was not full, stopping pagination", page);
                break;
            }
        }

        info!("Discovered {} papers submitted since {}", papers.len(), cutoff);
        Ok(papers)
    }

    /// Download the PDF of a paper
    pub async fn download_pdf(&self, paper: &PaperReference) -> Result<Vec<u8>, FetchError> {
        info!("Downloading PDF for {} from {}", paper.id, paper.pdf_url);
        let response = self.client.get(paper.pdf_url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: paper.pdf_url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content = response.bytes().await?;
        if content.is_empty() {
            return Err(FetchError::EmptyBody(paper.pdf_url.to_string()));
        }
        Ok(content.to_vec())
    }
}

/// Keep results that have a date on or after `cutoff`, a PDF link and an unseen identifier
pub fn select_papers(
    results: Vec<SearchResult>,
    cutoff: NaiveDate,
    seen: &mut HashSet<String>,
) -> Vec<PaperReference> {
    let mut papers = Vec::new();

    for (idx, result) in results.into_iter().enumerate() {
        let idx = idx + 1;
        let submitted = match result.submitted {
            Some(date) => date,
            None => {
                debug!("[Result {}] No submission date found; skipping.", idx);
                continue;
            }
        };

        if submitted < cutoff {
            debug!("[Result {}] Submitted {}, older than cutoff; skipping.", idx, submitted);
            continue;
        }

        let pdf_url = match result.pdf_url {
            Some(url) => url,
            None => {
                warn!("[Result {}] No PDF URL found; anchors: {:?}", idx, result.hrefs);
                continue;
            }
        };

        let id = match parser::paper_id_from_url(&pdf_url) {
            Some(id) => id,
            None => {
                warn!("[Result {}] Cannot derive a paper id from {}; skipping.", idx, pdf_url);
                continue;
            }
        };

        if !seen.insert(id.clone()) {
            debug!("[Result {}] Paper {} already queued; skipping.", idx, id);
            continue;
        }

        debug!("[Result {}] Queuing PDF URL: {}", idx, pdf_url);
        papers.push(PaperReference {
            id,
            title: result.title,
            submitted,
            pdf_url,
        });
    }

    papers
}

/// Save downloaded PDF bytes as `<dir>/<id>.pdf`
pub async fn save_pdf(dir: &Path, paper: &PaperReference, bytes: &[u8]) -> Result<PathBuf, FetchError> {
    let path = dir.join(format!("{}.pdf", paper.file_stem()));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| FetchError::Save {
            path: path.clone(),
            source,
        })?;
    info!("Saved PDF to: {:?}", path);
    Ok(path)
}
