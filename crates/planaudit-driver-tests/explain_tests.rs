#[cfg(test)]
mod explain_tests {
    use crate::fixtures::TestWorkspace;
    use anyhow::{Context, Result};
    use planaudit_analyzer::{NodeType, parse_plan_rows};
    use planaudit_driver_sqlite::ReferenceDatabase;
    use rstest::rstest;

    fn open(workspace: &TestWorkspace) -> Result<ReferenceDatabase> {
        ReferenceDatabase::open(workspace.database_path()).context("Failed to open test.db")
    }

    /// Queries that the planner can only answer by walking a whole table.
    #[rstest]
    #[case::unindexed_column("SELECT * FROM messages WHERE session_id = ?", "messages")]
    #[case::no_where_clause("SELECT * FROM sessions", "sessions")]
    #[case::unindexed_emoji("SELECT * FROM reactions WHERE emoji = ?", "reactions")]
    #[case::diesel_quoting(
        "SELECT `recipients`.`id` FROM `recipients` WHERE `recipients`.`profile_joined_name` = ?",
        "recipients"
    )]
    fn test_full_scan_is_flagged(#[case] query: &str, #[case] table: &str) -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let db = open(&workspace)?;

        let check = db.check(query)?;

        assert!(check.has_full_scan, "expected a full scan: {:?}", check.rows);
        assert!(
            check
                .rows
                .iter()
                .any(|row| row.detail == format!("SCAN {}", table)),
            "expected SCAN {}: {:?}",
            table,
            check.rows
        );

        Ok(())
    }

    /// Index and primary-key lookups are reported as SEARCH and are not flagged.
    #[rstest]
    #[case::primary_key("SELECT * FROM messages WHERE id = ?")]
    #[case::secondary_index("SELECT * FROM messages WHERE server_timestamp > ?")]
    #[case::unique_column("SELECT * FROM recipients WHERE e164 = ?")]
    #[case::foreign_key_index("SELECT * FROM attachments WHERE message_id = ?")]
    #[case::delete_by_key("DELETE FROM reactions WHERE reaction_id = ?")]
    fn test_indexed_lookup_is_not_flagged(#[case] query: &str) -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let db = open(&workspace)?;

        let check = db.check(query)?;

        assert!(!check.has_full_scan, "unexpected scan: {:?}", check.rows);
        assert!(check.rows.iter().all(|row| row.detail.starts_with("SEARCH")));

        Ok(())
    }

    #[test]
    fn test_temp_btree_alone_is_not_flagged() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let db = open(&workspace)?;

        let check = db.check("SELECT * FROM messages WHERE server_timestamp > ? ORDER BY text")?;

        assert!(!check.has_full_scan, "unexpected scan: {:?}", check.rows);
        assert!(
            check
                .rows
                .iter()
                .any(|row| row.detail.contains("TEMP B-TREE")),
            "expected a sort step: {:?}",
            check.rows
        );

        Ok(())
    }

    #[test]
    fn test_covering_index_scan_is_flagged_but_not_attributed() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let db = open(&workspace)?;

        let check = db.check("SELECT server_timestamp FROM messages")?;
        assert!(check.has_full_scan, "expected a scan: {:?}", check.rows);

        let plan = parse_plan_rows(
            check
                .rows
                .iter()
                .map(|row| (row.id, row.parent, row.detail.as_str())),
        )?;
        assert!(
            plan.iter_nodes()
                .any(|node| node.node_type == NodeType::IndexOnlyScan)
        );
        assert!(plan.scanned_tables().is_empty());

        Ok(())
    }

    #[test]
    fn test_rows_build_a_plan_tree() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let db = open(&workspace)?;

        let rows = db.explain(
            "SELECT * FROM messages WHERE session_id IN (SELECT id FROM sessions WHERE is_archived = ?)",
            &[0],
        )?;
        let plan = parse_plan_rows(
            rows.iter()
                .map(|row| (row.id, row.parent, row.detail.as_str())),
        )?;

        let wrapper = usize::from(plan.root.node_type == NodeType::Append);
        assert_eq!(plan.node_count(), rows.len() + wrapper);
        assert!(!plan.scanned_tables().is_empty(), "{:?}", rows);

        Ok(())
    }

    #[test]
    fn test_placeholders_are_bound() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let db = open(&workspace)?;

        let check = db.check(
            "UPDATE messages SET is_read = ? WHERE session_id = ? AND server_timestamp <= ?",
        )?;

        assert!(!check.rows.is_empty());

        Ok(())
    }

    #[test]
    fn test_unknown_table_is_a_database_error() -> Result<()> {
        let workspace = TestWorkspace::new()?;
        let db = open(&workspace)?;

        let err = db
            .check("SELECT * FROM calls WHERE id = ?")
            .expect_err("calls is not part of the schema");

        assert!(err.is_database());
        assert!(err.to_string().contains("SELECT * FROM calls"), "{}", err);

        Ok(())
    }
}
