//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The graph, the engine and the runner call store methods; they never
//! execute SQL directly.

use crate::{
    error::GraphResult,
    event::EventLogEntry,
    graph::GraphStore,
    model::{EdgeAttrs, NodeAttrs},
    snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot},
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open (or create) the snapshot database at `path`.
    pub fn open(path: &str) -> GraphResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GraphResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GraphResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_graph.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> GraphResult<()> {
        write_run(&self.conn, run_id, seed, version)
    }

    /// Persist a finished run in one transaction: run row, graph snapshot
    /// and event log. Nothing of the run is kept if any write fails.
    pub fn save_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        graph: &GraphStore,
        events: &[EventLogEntry],
    ) -> GraphResult<()> {
        let snapshot = graph.snapshot();
        let tx = self.conn.unchecked_transaction()?;
        write_run(&tx, run_id, seed, version)?;
        write_graph(&tx, run_id, &snapshot)?;
        for entry in events {
            write_event(&tx, entry)?;
        }
        tx.commit()?;
        log::info!(
            "saved run {run_id}: {} nodes, {} edges, {} events",
            snapshot.nodes.len(),
            snapshot.edges.len(),
            events.len()
        );
        Ok(())
    }

    pub fn run_exists(&self, run_id: &str) -> GraphResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM run WHERE run_id = ?1", params![run_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    // ── Graph snapshot ─────────────────────────────────────────

    /// Persist the full graph under `run_id`, replacing any earlier copy.
    pub fn save_graph(&self, run_id: &str, graph: &GraphStore) -> GraphResult<()> {
        let snapshot = graph.snapshot();
        let tx = self.conn.unchecked_transaction()?;
        write_graph(&tx, run_id, &snapshot)?;
        tx.commit()?;
        log::info!(
            "saved graph for run {run_id}: {} nodes, {} edges",
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(())
    }

    /// Load and rebuild the graph saved under `run_id`, if any.
    pub fn load_graph(&self, run_id: &str) -> GraphResult<Option<GraphStore>> {
        if !self.run_exists(run_id)? {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT node_key, attrs_json FROM graph_node WHERE run_id = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        let nodes = rows
            .into_iter()
            .map(|(key, json)| -> GraphResult<NodeSnapshot> {
                let attrs: NodeAttrs = serde_json::from_str(&json)?;
                Ok(NodeSnapshot { key, attrs })
            })
            .collect::<GraphResult<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT from_key, to_key, attrs_json FROM graph_edge WHERE run_id = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let edges = rows
            .into_iter()
            .map(|(from_key, to_key, json)| -> GraphResult<EdgeSnapshot> {
                let attrs: EdgeAttrs = serde_json::from_str(&json)?;
                Ok(EdgeSnapshot { from_key, to_key, attrs })
            })
            .collect::<GraphResult<Vec<_>>>()?;

        let graph = GraphStore::restore(&GraphSnapshot { nodes, edges })?;
        Ok(Some(graph))
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> GraphResult<()> {
        write_event(&self.conn, entry)
    }

    pub fn events_for_run(&self, run_id: &str) -> GraphResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, stage, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY seq ASC, id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    seq:        row.get::<_, i64>(2)? as u64,
                    stage:      row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str) -> GraphResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// ── Writers shared by single statements and the run transaction ─────

fn write_run(conn: &Connection, run_id: &str, seed: u64, version: &str) -> GraphResult<()> {
    conn.execute(
        "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
        params![run_id, seed as i64, version, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Replace the graph rows of `run_id`. Callers own the transaction.
fn write_graph(conn: &Connection, run_id: &str, snapshot: &GraphSnapshot) -> GraphResult<()> {
    conn.execute("DELETE FROM graph_edge WHERE run_id = ?1", params![run_id])?;
    conn.execute("DELETE FROM graph_node WHERE run_id = ?1", params![run_id])?;

    let mut insert_node = conn.prepare(
        "INSERT INTO graph_node (run_id, seq, kind, node_key, attrs_json)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (seq, node) in snapshot.nodes.iter().enumerate() {
        insert_node.execute(params![
            run_id,
            seq as i64,
            node.attrs.kind().label(),
            node.key,
            serde_json::to_string(&node.attrs)?,
        ])?;
    }

    let mut insert_edge = conn.prepare(
        "INSERT INTO graph_edge (run_id, seq, kind, from_key, to_key, attrs_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (seq, edge) in snapshot.edges.iter().enumerate() {
        insert_edge.execute(params![
            run_id,
            seq as i64,
            edge.attrs.kind().label(),
            edge.from_key,
            edge.to_key,
            serde_json::to_string(&edge.attrs)?,
        ])?;
    }
    Ok(())
}

fn write_event(conn: &Connection, entry: &EventLogEntry) -> GraphResult<()> {
    conn.execute(
        "INSERT INTO event_log (run_id, seq, stage, event_type, payload)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.run_id,
            entry.seq as i64,
            entry.stage,
            entry.event_type,
            entry.payload,
        ],
    )?;
    Ok(())
}
