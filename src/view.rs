//! HTML status pages.
//!
//! Markup lives in `templates/` and is filled by plain `{{ name }}`
//! substitution. Every value that originates outside the template, including
//! the `message` query parameter, goes through [`escape_html`] first.

use crate::file_models::StoredFile;
use crate::models::{User, Visit};
use crate::upload::ALLOWED_EXTENSIONS;
use std::path::Path;

const STYLE: &str = include_str!("../templates/style.css");
const RECORD_PAGE: &str = include_str!("../templates/sqlite_index.html");
const FILE_PAGE: &str = include_str!("../templates/file_index.html");

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "✅ YES"
    } else {
        "❌ NO"
    }
}

/// Single pass, so substituted values are never rescanned for placeholders.
fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut page = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{ ") {
        page.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        match after.find(" }}") {
            Some(end) => {
                let name = &after[..end];
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => page.push_str(value),
                    None => page.push_str(&rest[start..start + 3 + end + 3]),
                }
                rest = &after[end + 3..];
            }
            None => {
                page.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    page.push_str(rest);
    page
}

fn message_banner(message: Option<&str>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(
            "        <div class=\"info-box success\">\n            {}\n        </div>",
            escape_html(m)
        ),
        _ => String::new(),
    }
}

fn empty_note(text: &str) -> String {
    format!("            <p class=\"empty\">{}</p>", text)
}

fn path_text(path: &Path) -> String {
    escape_html(&path.display().to_string())
}

pub struct RecordPage<'a> {
    pub message: Option<&'a str>,
    pub total_visits: i64,
    pub total_users: i64,
    pub db_exists: bool,
    pub users: &'a [User],
    pub visits: &'a [Visit],
    pub storage_path: &'a Path,
    pub db_path: &'a Path,
}

impl RecordPage<'_> {
    pub fn render(&self) -> String {
        let users = if self.users.is_empty() {
            empty_note("No users yet. Add one above!")
        } else {
            let mut out = String::new();
            for user in self.users {
                out.push_str(&format!(
                    "            <div class=\"item\">\n                <strong>{}</strong> ({})<br>\n                <small class=\"muted\">Created: {}</small>\n            </div>",
                    escape_html(&user.username),
                    escape_html(&user.email),
                    user.created_at.format(TIME_FORMAT)
                ));
            }
            out
        };

        let visits = if self.visits.is_empty() {
            empty_note("No visits recorded yet")
        } else {
            let mut out = String::new();
            for visit in self.visits {
                out.push_str(&format!(
                    "            <div class=\"item\">\n                Visit #{} - {}<br>\n                <small class=\"muted\">{}</small>\n            </div>",
                    visit.id,
                    escape_html(&visit.page),
                    visit.timestamp.format(TIME_FORMAT)
                ));
            }
            out
        };

        fill(
            RECORD_PAGE,
            &[
                ("style", STYLE.to_string()),
                ("message", message_banner(self.message)),
                ("total_visits", self.total_visits.to_string()),
                ("total_users", self.total_users.to_string()),
                ("db_exists", yes_no(self.db_exists).to_string()),
                ("users", users),
                ("visits", visits),
                ("storage_path", path_text(self.storage_path)),
                ("db_path", path_text(self.db_path)),
            ],
        )
    }
}

pub struct FilePage<'a> {
    pub message: Option<&'a str>,
    pub visit_count: usize,
    pub file_count: usize,
    pub visits_file_exists: bool,
    pub upload_dir_exists: bool,
    pub files: &'a [StoredFile],
    pub recent_visits: &'a [String],
    pub storage_path: &'a Path,
    pub visits_file: &'a Path,
    pub upload_dir: &'a Path,
}

impl FilePage<'_> {
    pub fn render(&self) -> String {
        let files = if self.files.is_empty() {
            empty_note("No files uploaded yet")
        } else {
            let mut out = String::new();
            for file in self.files {
                let name = escape_html(&file.name);
                let modified = file
                    .modified
                    .map(|m| m.format(TIME_FORMAT).to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "            <div class=\"item\">\n                <a href=\"/download/{name}\">{name}</a> ({})<br>\n                <small class=\"muted\">Modified: {}</small>\n            </div>",
                    file.size_label(),
                    modified
                ));
            }
            out
        };

        let visits = if self.recent_visits.is_empty() {
            empty_note("No visits recorded yet")
        } else {
            let mut out = String::new();
            for stamp in self.recent_visits {
                out.push_str(&format!(
                    "            <div class=\"item\">{}</div>",
                    escape_html(stamp)
                ));
            }
            out
        };

        fill(
            FILE_PAGE,
            &[
                ("style", STYLE.to_string()),
                ("message", message_banner(self.message)),
                ("visit_count", self.visit_count.to_string()),
                ("file_count", self.file_count.to_string()),
                ("visits_file_exists", yes_no(self.visits_file_exists).to_string()),
                ("upload_dir_exists", yes_no(self.upload_dir_exists).to_string()),
                ("allowed", ALLOWED_EXTENSIONS.join(", ")),
                ("files", files),
                ("visits", visits),
                ("storage_path", path_text(self.storage_path)),
                ("visits_file", path_text(self.visits_file)),
                ("upload_dir", path_text(self.upload_dir)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record_page<'a>(message: Option<&'a str>, users: &'a [User]) -> RecordPage<'a> {
        RecordPage {
            message,
            total_visits: 7,
            total_users: users.len() as i64,
            db_exists: true,
            users,
            visits: &[],
            storage_path: Path::new("/app/storage"),
            db_path: Path::new("/app/storage/app.db"),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b onclick="x">&'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;&amp;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn message_is_escaped_not_injected() {
        let html = record_page(Some("<script>alert(1)</script>"), &[]).render();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let html = fill("[{{ a }}|{{ b }}|{{ c }}]", &[("a", "{{ b }}".into()), ("b", "B".into())]);
        assert_eq!(html, "[{{ b }}|B|{{ c }}]");
    }

    #[test]
    fn no_message_means_no_banner() {
        let html = record_page(None, &[]).render();
        assert!(!html.contains("info-box success"));
        assert!(html.contains("No users yet"));
    }

    #[test]
    fn every_placeholder_is_filled() {
        let users = vec![User {
            id: 1,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
        }];
        let html = record_page(Some("hi"), &users).render();
        assert!(!html.contains("{{"), "unfilled placeholder in record page");
        assert!(html.contains("STORAGE_PATH: /app/storage<br>"));
        assert!(html.contains("<strong>ada</strong> (ada@example.com)"));

        let files = vec![StoredFile {
            name: "20240101_000000_a.txt".to_string(),
            size: 3,
            modified: None,
        }];
        let html = FilePage {
            message: None,
            visit_count: 1,
            file_count: 1,
            visits_file_exists: true,
            upload_dir_exists: true,
            files: &files,
            recent_visits: &["2024-01-01T00:00:00+00:00".to_string()],
            storage_path: Path::new("/s"),
            visits_file: Path::new("/s/visits.txt"),
            upload_dir: Path::new("/s/uploads"),
        }
        .render();
        assert!(!html.contains("{{"), "unfilled placeholder in file page");
        assert!(html.contains("href=\"/download/20240101_000000_a.txt\""));
    }
}
