use std::fmt::Write as _;

use crate::error::Result;
use crate::shim::format_duration;
use crate::store::{AboutContent, AudioRecord};

/// Turns records and the about text into page bodies.
pub trait SiteRenderer {
    /// The listing page. `records` are already in display order.
    fn index(&self, records: &[AudioRecord]) -> Result<String>;
    fn about(&self, about: &AboutContent) -> Result<String>;
}

/// Escape text for use in HTML element content and quoted attributes.
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

/// Percent-encode each segment of a relative path for use in a URL.
pub fn url_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Plain HTML pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

fn head(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n\
         <link rel=\"icon\" href=\"icon.svg\">\n\
         </head>\n<body>\n",
        escape_html(title)
    )
}

fn nav() -> &'static str {
    "<nav><a href=\"index.html\">Recordings</a> | <a href=\"about.html\">About</a></nav>\n"
}

/// Multi-line text as paragraphs separated by `<br>`.
fn text_block(s: &str) -> String {
    s.lines().map(escape_html).collect::<Vec<_>>().join("<br>\n")
}

impl SiteRenderer for HtmlRenderer {
    fn index(&self, records: &[AudioRecord]) -> Result<String> {
        let mut html = head("Recordings");
        html.push_str(nav());
        writeln!(html, "<h1>Recordings</h1>\n<p>{} recordings</p>", records.len())?;
        html.push_str("<ol class=\"recordings\">\n");

        for (i, rec) in records.iter().enumerate() {
            writeln!(html, "<li id=\"rec-{}\">", i + 1)?;
            writeln!(html, "<h2>{}</h2>", escape_html(&rec.title))?;
            writeln!(
                html,
                "<p class=\"meta\"><time datetime=\"{}\">{}</time> &middot; {}",
                rec.recorded_at.to_rfc3339(),
                rec.recorded_at.format("%Y-%m-%d %H:%M"),
                format_duration(rec.duration_seconds)
            )?;
            if !rec.location.is_empty() {
                write!(html, " &middot; {}", escape_html(&rec.location))?;
            }
            html.push_str("</p>\n");
            if !rec.description.is_empty() {
                writeln!(html, "<p>{}</p>", text_block(&rec.description))?;
            }
            let src = escape_html(&url_path(&rec.compressed_path));
            writeln!(
                html,
                "<audio controls preload=\"none\" src=\"{src}\"></audio>\n\
                 <p class=\"download\"><a href=\"{src}\" download>{}</a> ({:.2} MB)</p>",
                escape_html(rec.file_name()),
                rec.compressed_size_mb
            )?;
            if rec.has_tech_info() {
                let t = rec.tech;
                writeln!(
                    html,
                    "<p class=\"tech\">{} Hz &middot; {} bit &middot; {} ch</p>",
                    t.sample_rate, t.bit_depth, t.channels
                )?;
            }
            html.push_str("</li>\n");
        }

        html.push_str("</ol>\n</body>\n</html>\n");
        Ok(html)
    }

    fn about(&self, about: &AboutContent) -> Result<String> {
        let mut html = head("About");
        html.push_str(nav());
        html.push_str("<h1>About</h1>\n");
        writeln!(html, "<div class=\"about\">{}</div>", text_block(&about.content))?;
        if !about.email.is_empty() {
            let email = escape_html(&about.email);
            writeln!(html, "<p>Contact: <a href=\"mailto:{email}\">{email}</a></p>")?;
        }
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}
