use crate::record::Record;
use crate::store::{LegendItem, Snapshot};
use crate::SiteData;
use serde_json::{json, Value};

/// Message shown in place of a section whose source could not be loaded
pub const LOAD_FAILURE_MESSAGE: &str = "Unable to load data. Please try again later.";

/// Escape text for use in element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap escaped `text` in a link when `url` is present
fn link_or_text(text: &str, url: Option<&str>) -> String {
    match url {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape_html(url),
            escape_html(text)
        ),
        None => escape_html(text),
    }
}

pub fn render_teaching_item(record: &Record) -> String {
    let mut html = String::from(r#"<div class="teaching-item">"#);

    let title = record.title().unwrap_or("(untitled course)");
    html.push_str(&format!(
        "<h3>{}</h3>",
        link_or_text(title, record.get_nonempty("url"))
    ));

    let meta: Vec<String> = ["role", "place", "year"]
        .iter()
        .filter_map(|field| record.get_nonempty(field))
        .map(escape_html)
        .collect();
    if !meta.is_empty() {
        html.push_str(&format!(r#"<p class="meta">{}</p>"#, meta.join(" &middot; ")));
    }

    if let Some(course_type) = record.get_nonempty("course_type") {
        html.push_str(&format!(
            r#"<span class="badge">{}</span>"#,
            escape_html(course_type)
        ));
    }

    if let Some(description) = record.get_nonempty("description") {
        html.push_str(&format!(
            r#"<p class="description">{}</p>"#,
            escape_html(description)
        ));
    }

    html.push_str("</div>");
    html
}

pub fn render_teaching(records: &[Record]) -> String {
    if records.is_empty() {
        return r#"<p class="empty">No teaching activities listed.</p>"#.to_string();
    }
    records.iter().map(render_teaching_item).collect()
}

pub fn render_publication(record: &Record) -> String {
    let entry_type = record.entry_type().unwrap_or("misc");
    let mut html = format!(
        r#"<div class="publication" data-type="{}">"#,
        escape_html(entry_type)
    );

    html.push_str(&format!(
        r#"<span class="pub-type">{}</span>"#,
        escape_html(entry_type)
    ));

    let title = record.title().unwrap_or("(untitled)");
    html.push_str(&format!(
        "<h3>{}</h3>",
        link_or_text(title, record.get_nonempty("url"))
    ));

    if let Some(author) = record.get_nonempty("author") {
        html.push_str(&format!(r#"<p class="authors">{}</p>"#, escape_html(author)));
    }

    let venue: Vec<String> = [record.venue(), record.get_nonempty("year")]
        .into_iter()
        .flatten()
        .map(escape_html)
        .collect();
    if !venue.is_empty() {
        html.push_str(&format!(r#"<p class="venue">{}</p>"#, venue.join(", ")));
    }

    if let Some(doi) = record.get_nonempty("doi") {
        html.push_str(&format!(
            r#"<p class="doi">DOI: <a href="https://doi.org/{}" target="_blank" rel="noopener">{}</a></p>"#,
            escape_html(doi),
            escape_html(doi)
        ));
    }

    if let Some(abstract_text) = record.get_nonempty("abstract") {
        html.push_str(&format!(
            r#"<details class="abstract"><summary>Abstract</summary><p>{}</p></details>"#,
            escape_html(abstract_text)
        ));
    }

    html.push_str("</div>");
    html
}

/// One badge per entry type; active badges carry the `active` class
pub fn render_legend(legend: &[LegendItem]) -> String {
    let mut html = String::from(r#"<div class="legend">"#);
    for item in legend {
        let class = if item.active {
            "legend-item active"
        } else {
            "legend-item"
        };
        html.push_str(&format!(
            r#"<button class="{}" data-type="{}">{} ({})</button>"#,
            class,
            escape_html(&item.entry_type),
            escape_html(&item.entry_type),
            item.count
        ));
    }
    html.push_str("</div>");
    html
}

/// Legend followed by the visible publications
pub fn render_publications(snapshot: &Snapshot) -> String {
    let mut html = render_legend(&snapshot.legend);
    if snapshot.records.is_empty() {
        html.push_str(r#"<p class="empty">No publications match the selected filters.</p>"#);
    } else {
        html.extend(snapshot.records.iter().map(render_publication));
    }
    html
}

pub fn render_load_failure() -> String {
    format!(r#"<p class="warning">{}</p>"#, LOAD_FAILURE_MESSAGE)
}

/// One `<section>` per loaded pipeline. A pipeline that failed renders the
/// load-failure message in place of its content; disabled pipelines are
/// left out.
pub fn render_site(data: &SiteData) -> String {
    let mut html = String::new();

    if let Some(teaching) = &data.teaching {
        let body = match teaching {
            Ok(records) => render_teaching(records),
            Err(_) => render_load_failure(),
        };
        html.push_str(&format!(r#"<section id="teaching">{}</section>"#, body));
        html.push('\n');
    }

    if let Some(publications) = &data.publications {
        let body = match publications {
            Ok(store) => render_publications(&store.snapshot()),
            Err(_) => render_load_failure(),
        };
        html.push_str(&format!(r#"<section id="publications">{}</section>"#, body));
        html.push('\n');
    }

    html
}

/// JSON counterpart of [`render_site`]: teaching records, the publication
/// snapshot, `{"error": ..}` for a failed pipeline and `null` for a disabled one
pub fn site_json(data: &SiteData) -> serde_json::Result<Value> {
    let teaching = match &data.teaching {
        Some(Ok(records)) => serde_json::to_value(records)?,
        Some(Err(e)) => json!({ "error": e.to_string() }),
        None => Value::Null,
    };
    let publications = match &data.publications {
        Some(Ok(store)) => serde_json::to_value(store.snapshot())?,
        Some(Err(e)) => json!({ "error": e.to_string() }),
        None => Value::Null,
    };

    Ok(json!({
        "teaching": teaching,
        "publications": publications,
    }))
}
