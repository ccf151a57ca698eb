use auditflow::core::config::SessionConfig;
use auditflow::core::journal;
use auditflow::core::schemas;
use auditflow::core::store::{KvStore, SqliteStore};
use auditflow::plugins::graph::{Edge, NewNode, Position};
use auditflow::plugins::templates::TemplateCategory;
use auditflow::plugins::view::RenderMode;
use auditflow::session::DiagramSession;
use std::path::Path;
use tempfile::tempdir;

fn open(root: &Path) -> DiagramSession {
    let store = SqliteStore::open(root).expect("open sqlite store");
    DiagramSession::open(Box::new(store), SessionConfig::default())
}

#[test]
fn diagram_and_history_survive_reopen() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join(".auditflow");

    let project_id = {
        let mut s = open(&root);
        s.add_node(NewNode::labeled("Plan").with_id("plan"));
        s.add_node(NewNode::labeled("Fieldwork").with_id("field"));
        assert!(s.add_edge(Edge::new("e1", "plan", "field")));
        s.set_project_name("FY26 audit");
        assert!(s.last_persist_error().is_none());
        s.graph().meta().project_id.clone()
    };

    let mut s = open(&root);
    assert_eq!(s.graph().nodes().len(), 2);
    assert_eq!(s.graph().edges().len(), 1);
    assert_eq!(s.graph().meta().project_name, "FY26 audit");
    assert_eq!(s.graph().meta().project_id, project_id);
    assert_eq!(s.history_info().past_count, 3);

    // Undo keeps working across reloads.
    assert!(s.undo());
    assert!(s.graph().edges().is_empty());
    assert!(s.can_redo());

    let s = open(&root);
    assert!(s.can_redo());
    assert!(s.graph().edges().is_empty());
}

#[test]
fn view_preferences_persist_but_interaction_state_does_not() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join(".auditflow");

    {
        let mut s = open(&root);
        s.with_view("prefs", |v| {
            assert!(v.set_theme_preset("dark"));
            v.set_grid_size(40);
            v.set_render_mode(RenderMode::Raster);
            v.set_animations_enabled(false);
            v.set_zoom(2.5);
            v.set_pan(Position::new(120.0, -40.0));
            v.set_dragging(true);
            v.set_editing_node(Some("n1".to_string()));
        });
    }

    let s = open(&root);
    let view = s.view();
    assert_eq!(view.theme.name, "dark");
    assert_eq!(view.grid.size, 40);
    assert_eq!(view.render_mode, RenderMode::Raster);
    assert!(!view.animations_enabled);
    assert_eq!(view.zoom, 1.0);
    assert_eq!(view.pan, Position::default());
    assert!(!view.dragging);
    assert!(view.editing_node.is_none());
}

#[test]
fn templates_favorites_and_recents_persist() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join(".auditflow");

    let saved = {
        let mut s = open(&root);
        s.add_node(NewNode::labeled("Only step"));
        let id = s.save_as_template("Mine", "one step", TemplateCategory::Training);
        s.add_to_favorites(&id);
        s.add_to_favorites("risk-decision-tree");
        assert!(s.apply_template_by_id("incident-response"));
        id
    };

    let s = open(&root);
    let engine = s.templates();
    assert_eq!(engine.custom_templates().len(), 1);
    assert_eq!(engine.custom_templates()[0].id, saved);
    assert_eq!(
        engine.favorite_ids(),
        &[saved.clone(), "risk-decision-tree".to_string()]
    );
    assert_eq!(engine.recent_ids(), &["incident-response".to_string()]);
    // Built-ins are never stored.
    assert!(engine.get("audit-process-flow").is_some());
}

#[test]
fn selection_is_not_persisted() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join(".auditflow");
    {
        let mut s = open(&root);
        s.add_node(NewNode::labeled("A").with_id("a"));
        s.select_node("a", false);
        s.save_all();
    }
    let s = open(&root);
    assert!(s.selection().is_empty());
}

#[test]
fn corrupt_entry_falls_back_to_defaults_for_that_component_only() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join(".auditflow");
    {
        let mut s = open(&root);
        s.add_node(NewNode::labeled("Survivor").with_id("survivor"));
    }
    {
        let mut store = SqliteStore::open(&root).expect("open store");
        store
            .set(schemas::TEMPLATES_KEY, &serde_json::json!({"favorites": "not-a-list"}))
            .expect("write corrupt value");
    }

    let s = open(&root);
    assert!(s.graph().node("survivor").is_some());
    assert!(s.templates().favorite_ids().is_empty());
    let failed: Vec<&str> = s
        .journal()
        .events()
        .filter(|e| e.status == journal::STATUS_ERROR)
        .map(|e| e.op.as_str())
        .collect();
    assert_eq!(failed, vec!["restore.auditflow.templates"]);
}

#[test]
fn sqlite_store_round_trips_and_removes() {
    let tmp = tempdir().expect("tempdir");
    let mut store = SqliteStore::open(tmp.path()).expect("open store");
    assert!(store.get("missing").unwrap().is_none());

    store.set("k", &serde_json::json!({"a": 1})).unwrap();
    store.set("k", &serde_json::json!({"a": 2})).unwrap();
    assert_eq!(store.get("k").unwrap(), Some(serde_json::json!({"a": 2})));

    store.remove("k").unwrap();
    assert!(store.get("k").unwrap().is_none());

    let audit = std::fs::read_to_string(tmp.path().join(schemas::BROKER_LOG_NAME))
        .expect("broker audit log");
    assert!(audit.contains("kv.set"));
    assert!(audit.contains("kv.remove"));
}

#[test]
fn journal_file_mirrors_session_events() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join(".auditflow");
    let log = root.join(schemas::SESSION_LOG_NAME);
    {
        let mut s = open(&root).with_journal_file(&log);
        s.add_node(NewNode::labeled("A"));
        s.undo();
    }
    let events = journal::read_events(&log, 20).expect("read journal");
    let ops: Vec<&str> = events.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(
        ops,
        vec![
            "restore.auditflow.diagram",
            "restore.auditflow.history",
            "restore.auditflow.view",
            "restore.auditflow.templates",
            "session.open",
            "graph.add_node",
            "history.undo",
        ]
    );
}
