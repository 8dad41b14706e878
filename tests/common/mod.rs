#![allow(dead_code)]

use chrono::NaiveDate;
use reqwest::Url;
use arxiv_digest::PaperReference;

/// Build a one-page PDF with one Helvetica text line per entry in `lines`.
/// An empty slice gives a valid PDF without any text.
pub fn make_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = 720 - (i as i32) * 20;
        content.push_str(&format!("BT /F1 12 Tf 72 {} Td ({}) Tj ET\n", y, line));
    }

    let objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    pdf
}

/// One `li.arxiv-result` entry in the markup arXiv serves
pub fn search_result_html(id: &str, title: &str, submitted: &str, pdf_href: &str) -> String {
    format!(
        r#"<li class="arxiv-result">
  <div class="is-marginless">
    <p class="list-title is-inline-block"><a href="https://arxiv.org/abs/{id}">arXiv:{id}</a>
      <span>&nbsp;[<a href="{pdf_href}">pdf</a>, <a href="https://arxiv.org/format/{id}">other</a>]</span>
    </p>
  </div>
  <p class="title is-5 mathjax">
    {title}
  </p>
  <p class="authors"><span class="search-hit">Authors:</span> <a href="/a/doe_j_1">Jane Doe</a></p>
  <p class="is-size-7"><span class="has-text-black-bis has-text-weight-semibold">Submitted</span> {submitted}; <span class="has-text-black-bis has-text-weight-semibold">originally announced</span> March 2025.</p>
</li>"#
    )
}

/// A full search page wrapping the given result entries
pub fn search_page_html(results: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Search | arXiv e-print repository</title></head>
<body><main><div class="content">
<ol class="breathe-horizontal" start="1">
{}
</ol>
</div></main></body></html>"#,
        results.join("\n")
    )
}

pub fn paper(id: &str, pdf_url: &str) -> PaperReference {
    PaperReference {
        id: id.to_string(),
        title: Some(format!("Paper {}", id)),
        submitted: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
        pdf_url: Url::parse(pdf_url).unwrap(),
    }
}

pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
