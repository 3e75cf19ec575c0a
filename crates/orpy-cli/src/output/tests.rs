// Tests for table rendering and the output writer

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Writer that keeps everything written to it
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, Box::new(buffer.clone()));
    (writer, buffer)
}

#[test]
fn test_format_cell() {
    assert_eq!(format_cell(None), "");
    assert_eq!(format_cell(Some(&Value::Null)), "");
    assert_eq!(format_cell(Some(&json!("CREATE_COMPLETE"))), "CREATE_COMPLETE");
    assert_eq!(format_cell(Some(&json!(3))), "3");
    assert_eq!(format_cell(Some(&json!(["a", "b"]))), "a, b");
    assert_eq!(
        format_cell(Some(&json!({"subject": "abc", "issuer": "https://iam/"}))),
        "issuer='https://iam/', subject='abc'"
    );
}

#[test]
fn test_render_table() {
    let rows = vec![
        vec!["u1".to_string(), "CREATE_COMPLETE".to_string()],
        vec!["u22".to_string(), String::new()],
    ];
    let (header, lines) = render_table(&["uuid", "status"], &rows);

    assert_eq!(header, "uuid │ status");
    assert_eq!(lines[0], format!("{}─┼─{}", "─".repeat(4), "─".repeat(15)));
    assert_eq!(lines[1], "u1   │ CREATE_COMPLETE");
    assert_eq!(lines[2], "u22  │");
}

#[test]
fn test_list_table_uses_columns() {
    let (mut output, buffer) = writer(OutputFormat::Table);
    let items = vec![
        json!({"uuid": "a", "status": "CREATE_COMPLETE", "links": []}),
        json!({"uuid": "b", "createdBy": {"subject": "s", "issuer": "i"}}),
    ];
    output.list(&["uuid", "status", "createdBy"], &items).unwrap();

    let text = buffer.contents();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("uuid │ status"));
    assert!(lines[2].starts_with("a    │ CREATE_COMPLETE"));
    assert!(lines[3].ends_with("issuer='i', subject='s'"));
    assert!(!text.contains("links"));
}

#[test]
fn test_list_machine_formats_keep_everything() {
    let (mut output, buffer) = writer(OutputFormat::Json);
    let items = vec![json!({"uuid": "a", "links": []})];
    output.list(DEPLOYMENT_COLUMNS, &items).unwrap();
    assert_eq!(buffer.contents(), "[{\"uuid\":\"a\",\"links\":[]}]\n");

    let (mut output, buffer) = writer(OutputFormat::Yaml);
    output.list(DEPLOYMENT_COLUMNS, &items).unwrap();
    assert!(buffer.contents().starts_with("- uuid: a\n"));
}

#[test]
fn test_show_sorts_fields() {
    let (mut output, buffer) = writer(OutputFormat::Table);
    output
        .show(&json!({"uuid": "u1", "status": "CREATE_FAILED", "outputs": {}}))
        .unwrap();

    let text = buffer.contents();
    let rows: Vec<Vec<&str>> = text
        .lines()
        .skip(2)
        .map(|line| line.split('│').map(str::trim).collect())
        .collect();
    let fields: Vec<&str> = rows.iter().map(|row| row[0]).collect();
    assert_eq!(fields, vec!["outputs", "status", "uuid"]);

    // empty mappings still get a (blank) value column
    assert_eq!(rows[0], vec!["outputs", ""]);
    assert_eq!(rows[1], vec!["status", "CREATE_FAILED"]);
}

#[test]
fn test_text_output() {
    let (mut output, buffer) = writer(OutputFormat::Table);
    output.text("tosca_definitions_version: x\n").unwrap();
    assert_eq!(buffer.contents(), "tosca_definitions_version: x\n");

    let (mut output, buffer) = writer(OutputFormat::Json);
    output.text("a\nb").unwrap();
    assert_eq!(buffer.contents(), "\"a\\nb\"\n");
}

#[test]
fn test_success_only_in_table_mode() {
    let (mut output, buffer) = writer(OutputFormat::Json);
    output.success("Deployment deleted").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut output, buffer) = writer(OutputFormat::Table);
    output.success("Deployment deleted").unwrap();
    assert_eq!(buffer.contents(), "Deployment deleted\n");
}

#[test]
fn test_output_formatter_trait() {
    let value = json!({"a": 1});
    assert_eq!(OutputFormat::Json.format(&value).unwrap(), "{\"a\":1}");
    assert_eq!(OutputFormat::JsonPretty.format(&value).unwrap(), "{\n  \"a\": 1\n}");
    assert_eq!(OutputFormat::Yaml.format(&value).unwrap(), "a: 1\n");
}
