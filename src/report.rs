use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use uuid::Uuid;

use crate::pdf::{Align, Pdf};
use crate::store::{AssignmentEntry, SvcError};

const SEPARATOR: &str = "---------------------------------------------";
const SINGLE_MARGIN: f64 = 72.0;
const COMBINED_MARGIN: f64 = 50.0;
// Layout constant: once the cursor passes this, the combined report forces a
// break rather than letting the next entry straddle the page edge.
const FORCE_BREAK_Y: f64 = 700.0;

pub fn session_report_path(reports_dir: &Path, id: &str) -> PathBuf {
    reports_dir.join(format!("{id}.pdf"))
}

pub fn class_report_path(reports_dir: &Path, id: &str) -> PathBuf {
    reports_dir.join(format!("class-{id}.pdf"))
}

/// Single-session report: one block per answer slot, in slot order.
/// Pagination is left to the writer's bottom-margin overflow rule.
pub fn render_session_report(responses: &[String], out: &Path) -> Result<(), SvcError> {
    let mut doc = Pdf::new(SINGLE_MARGIN);
    doc.text(18.0, "Responses", Align::Center);
    doc.move_down(1.0);

    for (i, response) in responses.iter().enumerate() {
        doc.text(14.0, &format!("Response {}", i + 1), Align::Left);
        doc.move_down(0.5);
        let body = if response.is_empty() {
            "(No response)"
        } else {
            response.as_str()
        };
        doc.text(12.0, body, Align::Left);
        doc.move_down(1.0);
        doc.text(12.0, SEPARATOR, Align::Left);
        doc.move_down(1.0);
    }

    write_artifact(&doc.render(), out)
}

/// Combined class report over pre-sorted entries. Callers short-circuit the
/// empty case before getting here; an empty input never creates a file.
pub fn render_class_report(entries: &[AssignmentEntry], out: &Path) -> Result<(), SvcError> {
    if entries.is_empty() {
        return Err(SvcError::new("invalid_input", "no entries to render"));
    }

    let mut doc = Pdf::new(COMBINED_MARGIN);
    doc.text(20.0, "Class Responses", Align::Center);
    doc.move_down(2.0);

    let last = entries.len() - 1;
    for (i, entry) in entries.iter().enumerate() {
        let name = if entry.name.is_empty() {
            "Unnamed"
        } else {
            entry.name.as_str()
        };
        doc.text_underlined(14.0, name);
        doc.set_fill_gray(0.5);
        doc.text(10.0, &format_submitted_at(entry.submitted_at), Align::Left);
        doc.set_fill_gray(0.0);
        doc.move_down(0.5);
        doc.text(12.0, &entry.response, Align::Left);

        if i != last {
            doc.move_down(1.0);
            doc.hr();
            doc.move_down(1.0);
        }
        if doc.cursor_y() > FORCE_BREAK_Y {
            doc.add_page();
        }
    }

    write_artifact(&doc.render(), out)
}

fn format_submitted_at(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Writes through a unique staging name, syncs, then renames into place, so a
/// reader of the final path never observes partial bytes and two writers of
/// the same artifact cannot interleave.
fn write_artifact(bytes: &[u8], out: &Path) -> Result<(), SvcError> {
    let io_err = |e: std::io::Error| SvcError::new("io_failed", e.to_string());

    let dir = out.parent().ok_or_else(|| {
        SvcError::new("io_failed", format!("no parent directory for {}", out.display()))
    })?;
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let file_name = out
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SvcError::new("io_failed", "artifact path has no file name"))?;
    let staging = dir.join(format!(".{file_name}.tmp-{}", Uuid::new_v4()));

    let result = (|| {
        let mut f = std::fs::File::create(&staging).map_err(io_err)?;
        f.write_all(bytes).map_err(io_err)?;
        f.sync_all().map_err(io_err)?;
        std::fs::rename(&staging, out).map_err(io_err)
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn entry(name: &str, response: &str) -> AssignmentEntry {
        AssignmentEntry {
            id: "a1".to_string(),
            name: name.to_string(),
            response: response.to_string(),
            submitted_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn session_report_renders_slots_and_placeholder() {
        let dir = temp_dir("respond-report");
        let out = session_report_path(&dir, "s1");

        let mut responses = vec![String::new(); 30];
        responses[2] = "hello".to_string();
        render_session_report(&responses, &out).expect("render");

        let text = String::from_utf8_lossy(&std::fs::read(&out).expect("read")).into_owned();
        assert!(text.contains("(Responses) Tj"));
        assert!(text.contains("(Response 3) Tj"));
        assert!(text.contains("(hello) Tj"));
        assert!(text.contains("(Response 1) Tj"));
        assert!(text.contains("(\\(No response\\)) Tj"));
    }

    #[test]
    fn class_report_refuses_empty_input_without_a_file() {
        let dir = temp_dir("respond-report");
        let out = class_report_path(&dir, "a1");
        let err = render_class_report(&[], &out).unwrap_err();
        assert_eq!(err.code, "invalid_input");
        assert!(!out.exists());
    }

    #[test]
    fn class_report_has_divider_between_entries_only() {
        let dir = temp_dir("respond-report");
        let out = class_report_path(&dir, "a1");
        render_class_report(&[entry("Alice", "one"), entry("Bob", "two")], &out)
            .expect("render");
        let text = String::from_utf8_lossy(&std::fs::read(&out).expect("read")).into_owned();
        assert!(text.contains("(Class Responses) Tj"));
        assert!(text.contains("(Alice) Tj"));
        assert!(text.contains("(Bob) Tj"));
    }

    #[test]
    fn empty_name_renders_as_unnamed() {
        let dir = temp_dir("respond-report");
        let out = class_report_path(&dir, "a1");
        render_class_report(&[entry("", "something")], &out).expect("render");
        let text = String::from_utf8_lossy(&std::fs::read(&out).expect("read")).into_owned();
        assert!(text.contains("(Unnamed) Tj"));
    }

    #[test]
    fn twenty_five_entries_force_at_least_one_break() {
        let dir = temp_dir("respond-report");
        let out = class_report_path(&dir, "a1");
        let entries: Vec<AssignmentEntry> = (0..25)
            .map(|i| entry(&format!("Student {i:02}"), "a short answer"))
            .collect();
        render_class_report(&entries, &out).expect("render");
        let text = String::from_utf8_lossy(&std::fs::read(&out).expect("read")).into_owned();
        let pages = text.matches("/Type /Page ").count();
        assert!(pages >= 2, "expected a forced page break, got {pages} page(s)");
    }

    #[test]
    fn no_staging_files_remain_after_success() {
        let dir = temp_dir("respond-report");
        let out = session_report_path(&dir, "s1");
        render_session_report(&vec![String::new(); 30], &out).expect("render");
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
