//! Output formatting for extraction results (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::extract::models::{BatchItem, ExtractionResult};

/// Formats results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single result.
    pub fn format_result(&self, result: &ExtractionResult) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_single(result),
            OutputFormat::Markdown => self.markdown_single(result),
            OutputFormat::Csv => {
                self.csv_items(&[BatchItem::Success(result.clone())])
            }
        }
    }

    /// Formats a batch, failures included.
    pub fn format_batch(&self, items: &[BatchItem]) -> String {
        if items.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No results.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string()),
            OutputFormat::Table => self.table_batch(items),
            OutputFormat::Markdown => self.markdown_batch(items),
            OutputFormat::Csv => self.csv_items(items),
        }
    }

    // Table formatting

    fn table_single(&self, result: &ExtractionResult) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Name:      {}", result.name));
        lines.push(format!("Price:     {:.2}", result.price));
        lines.push(format!("Site:      {}", result.site));
        lines.push(format!("URL:       {}", result.url));

        if !result.thumbnail.is_empty() {
            lines.push(format!("Image:     {}", result.thumbnail));
        }

        if !result.description.is_empty() {
            lines.push(format!("About:     {}", truncate(&result.description, 100)));
        }

        if let Some(meta) = &result.game_metadata {
            let fields = [
                ("Genre", &meta.genre),
                ("Platform", &meta.platform),
                ("Publisher", &meta.publisher),
                ("Developer", &meta.developer),
                ("Released", &meta.release_date),
            ];
            for (label, value) in fields {
                if let Some(value) = value {
                    lines.push(format!("{:<10} {}", format!("{}:", label), value));
                }
            }
        }

        lines.push(format!(
            "Status:    {}{}",
            if result.status.is_complete { "Complete" } else { "Partial" },
            if result.status.site_supported { "" } else { " (generic site)" }
        ));

        for warning in &result.status.warnings {
            lines.push(format!("Warning:   {}", warning));
        }

        lines.push(format!("Scraped:   {}", result.scraped_at.to_rfc3339()));

        lines.join("\n")
    }

    fn table_batch(&self, items: &[BatchItem]) -> String {
        let status_width = 8;
        let price_width = 10;
        let site_width = 24;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<status_width$}  {:<price_width$}  {:<site_width$}  {}",
            "Status", "Price", "Site", "Name / Error"
        ));
        lines.push(format!(
            "{:-<status_width$}  {:-<price_width$}  {:-<site_width$}  {:-<40}",
            "", "", "", ""
        ));

        for item in items {
            let line = match item {
                BatchItem::Success(result) => format!(
                    "{:<status_width$}  {:<price_width$}  {:<site_width$}  {}",
                    if result.status.is_complete { "OK" } else { "PARTIAL" },
                    format!("{:.2}", result.price),
                    truncate(&result.site, site_width),
                    truncate(&result.name, 60)
                ),
                BatchItem::Failure(error) => format!(
                    "{:<status_width$}  {:<price_width$}  {:<site_width$}  {}",
                    "ERROR",
                    "-",
                    truncate(&host_of(&error.url), site_width),
                    truncate(&error.error, 60)
                ),
            };
            lines.push(line);
        }

        let failed = items.iter().filter(|i| !i.is_success()).count();
        lines.push(String::new());
        lines.push(format!("{} results, {} failed", items.len(), failed));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, result: &ExtractionResult) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", result.name));
        lines.push(String::new());
        lines.push(format!("- **Price:** {:.2}", result.price));
        lines.push(format!("- **Site:** {}", result.site));
        lines.push(format!("- **URL:** {}", result.url));

        if !result.thumbnail.is_empty() {
            lines.push(format!("- **Image:** ![]({})", result.thumbnail));
        }

        if !result.status.is_complete {
            lines.push(format!("- **Warnings:** {}", result.status.warnings.join("; ")));
        }

        lines.join("\n")
    }

    fn markdown_batch(&self, items: &[BatchItem]) -> String {
        let mut lines = Vec::new();

        lines.push("| Status | Price | Site | Name |".to_string());
        lines.push("|--------|-------|------|------|".to_string());

        for item in items {
            match item {
                BatchItem::Success(result) => lines.push(format!(
                    "| {} | {:.2} | {} | [{}]({}) |",
                    if result.status.is_complete { "✓" } else { "partial" },
                    result.price,
                    result.site,
                    truncate(&result.name, 40).replace('|', "\\|"),
                    result.url
                )),
                BatchItem::Failure(error) => lines.push(format!(
                    "| ✗ | - | {} | {} |",
                    host_of(&error.url),
                    error.error.replace('|', "\\|")
                )),
            }
        }

        lines.push(String::new());
        lines.push(format!("*{} results*", items.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "url,ok,complete,name,price,site,thumbnail,scraped_at,error".to_string()
    }

    fn csv_items(&self, items: &[BatchItem]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for item in items {
            match item {
                BatchItem::Success(result) => lines.push(format!(
                    "{},true,{},{},{},{},{},{},",
                    Self::csv_escape(&result.url),
                    result.status.is_complete,
                    Self::csv_escape(&result.name),
                    result.price,
                    result.site,
                    Self::csv_escape(&result.thumbnail),
                    result.scraped_at.to_rfc3339()
                )),
                BatchItem::Failure(error) => lines.push(format!(
                    "{},false,false,,,,,,{}",
                    Self::csv_escape(&error.url),
                    Self::csv_escape(&error.error)
                )),
            }
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::models::{ErrorResult, ExtractionStatus, GameMetadata};
    use chrono::Utc;

    fn make_result() -> ExtractionResult {
        ExtractionResult {
            name: "Desk Lamp, Brass".to_string(),
            price: 34.5,
            thumbnail: "https://cdn.test/lamp.jpg".to_string(),
            description: "A lamp.".to_string(),
            site: "lampworld.test".to_string(),
            scraped_at: Utc::now(),
            url: "https://www.lampworld.test/p/1".to_string(),
            game_metadata: None,
            status: ExtractionStatus { is_complete: true, warnings: Vec::new(), site_supported: false },
        }
    }

    fn make_failure() -> BatchItem {
        BatchItem::Failure(ErrorResult::new("https://shop.test/p/2", "Request timed out after 100ms"))
    }

    #[test]
    fn test_table_single() {
        let output = Formatter::new(OutputFormat::Table).format_result(&make_result());
        assert!(output.contains("Name:      Desk Lamp, Brass"));
        assert!(output.contains("Price:     34.50"));
        assert!(output.contains("Complete (generic site)"));
    }

    #[test]
    fn test_table_single_game_and_warnings() {
        let mut result = make_result();
        result.game_metadata = Some(GameMetadata { genre: Some("RPG".to_string()), ..GameMetadata::default() });
        result.status.is_complete = false;
        result.status.warnings.push("Could not extract product image".to_string());

        let output = Formatter::new(OutputFormat::Table).format_result(&result);
        assert!(output.contains("Genre:     RPG"));
        assert!(output.contains("Partial"));
        assert!(output.contains("Warning:   Could not extract product image"));
    }

    #[test]
    fn test_json_single() {
        let output = Formatter::new(OutputFormat::Json).format_result(&make_result());
        assert!(output.starts_with('{'));
        assert!(output.contains("\"thumbnail\""));
    }

    #[test]
    fn test_table_batch() {
        let items = vec![BatchItem::Success(make_result()), make_failure()];
        let output = Formatter::new(OutputFormat::Table).format_batch(&items);
        assert!(output.contains("OK"));
        assert!(output.contains("ERROR"));
        assert!(output.contains("shop.test"));
        assert!(output.contains("2 results, 1 failed"));
    }

    #[test]
    fn test_markdown_batch() {
        let items = vec![BatchItem::Success(make_result()), make_failure()];
        let output = Formatter::new(OutputFormat::Markdown).format_batch(&items);
        assert!(output.contains("| Status | Price | Site | Name |"));
        assert!(output.contains("[Desk Lamp, Brass](https://www.lampworld.test/p/1)"));
        assert!(output.contains("*2 results*"));
    }

    #[test]
    fn test_csv_batch() {
        let items = vec![BatchItem::Success(make_result()), make_failure()];
        let output = Formatter::new(OutputFormat::Csv).format_batch(&items);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("\"Desk Lamp, Brass\""));
        assert!(lines[2].ends_with("Request timed out after 100ms"));
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(Formatter::new(OutputFormat::Json).format_batch(&[]), "[]");
        assert_eq!(Formatter::new(OutputFormat::Table).format_batch(&[]), "No results.");
        assert!(Formatter::new(OutputFormat::Csv).format_batch(&[]).starts_with("url,"));
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(Formatter::csv_escape("plain"), "plain");
        assert_eq!(Formatter::csv_escape("a,b"), "\"a,b\"");
        assert_eq!(Formatter::csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(Formatter::csv_escape("line\r\nbreak"), "\"line\r\nbreak\"");
        assert_eq!(Formatter::csv_escape("carriage\rreturn"), "\"carriage\rreturn\"");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long product name", 10), "a very ...");
    }
}
