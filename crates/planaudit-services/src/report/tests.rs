use super::*;
use indoc::indoc;
use pretty_assertions::assert_eq;

#[test]
fn test_report_block() {
    let entry = LogEntry::new(1, "SELECT * FROM messages WHERE session_id = ?", 42);
    let rows = vec![PlanRow::new(2, 0, 0, "SCAN messages")];

    let mut out = Vec::new();
    write_report(&mut out, &entry, &rows).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        indoc! {"
            Query with SCAN: SELECT * FROM messages WHERE session_id = ? is executed times: 42
            42 [(2, 0, 0, 'SCAN messages')]

        "}
    );
}

#[test]
fn test_report_lists_every_plan_row() {
    let entry = LogEntry::new(4, "SELECT * FROM messages ORDER BY text", 7);
    let rows = vec![
        PlanRow::new(2, 0, 0, "SCAN messages"),
        PlanRow::new(10, 0, 0, "USE TEMP B-TREE FOR ORDER BY"),
    ];

    let mut out = Vec::new();
    write_report(&mut out, &entry, &rows).unwrap();
    let text = String::from_utf8(out).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "7 [(2, 0, 0, 'SCAN messages'), (10, 0, 0, 'USE TEMP B-TREE FOR ORDER BY')]"
    );
    assert_eq!(lines[2], "");
}
