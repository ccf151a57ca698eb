use regex::Regex;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run_auditflow(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_auditflow"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run auditflow")
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = args.to_vec();
    full.extend(["--format", "json"]);
    let out = run_auditflow(dir, &full);
    assert!(
        out.status.success(),
        "auditflow {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("json envelope")
}

fn init(dir: &Path) {
    let out = run_auditflow(dir, &["init"]);
    assert!(
        out.status.success(),
        "auditflow init failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn commands_require_init() {
    let tmp = tempdir().expect("tempdir");
    let out = run_auditflow(tmp.path(), &["show"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("auditflow init"));
}

#[test]
fn init_writes_config_and_database() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());

    let root = tmp.path().join(".auditflow");
    assert!(root.join("auditflow.db").exists());
    let config = fs::read_to_string(root.join("auditflow.toml")).expect("read config");
    assert!(config.contains("[history]"));
    assert!(config.contains("max_size = 50"));

    // A second init keeps a hand-edited config.
    fs::write(root.join("auditflow.toml"), "[history]\nmax_size = 7\n").unwrap();
    init(tmp.path());
    let config = fs::read_to_string(root.join("auditflow.toml")).unwrap();
    assert!(config.contains("max_size = 7"));
}

#[test]
fn node_edge_undo_redo_round_trip_across_invocations() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let dir = tmp.path();

    let a = run_json(dir, &["node", "add", "--label", "Plan", "--id", "a"]);
    assert_eq!(a["status"], "success");
    assert_eq!(a["id"], "a");
    run_json(dir, &["node", "add", "--label", "Review?", "--kind", "decision", "--id", "b"]);
    let e = run_json(dir, &["edge", "add", "--source", "a", "--target", "b", "--label", "next"]);
    assert_eq!(e["cmd"], "edge.add");

    let shown = run_json(dir, &["show"]);
    assert_eq!(shown["document"]["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(shown["document"]["edges"].as_array().unwrap().len(), 1);
    assert_eq!(shown["document"]["nodes"][1]["type"], "decision");
    assert_eq!(shown["history"]["pastCount"], 3);

    let undo = run_json(dir, &["undo"]);
    assert_eq!(undo["action"], "Add Edge");
    let shown = run_json(dir, &["show"]);
    assert!(shown["document"]["edges"].as_array().unwrap().is_empty());

    run_json(dir, &["redo"]);
    let shown = run_json(dir, &["show"]);
    assert_eq!(shown["document"]["edges"].as_array().unwrap().len(), 1);
}

#[test]
fn generated_ids_are_prefixed_ulids() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let node = run_json(tmp.path(), &["node", "add", "--label", "A"]);
    let id = node["id"].as_str().unwrap().to_string();
    let id_re = Regex::new(r"^node_[0-9a-z]{26}$").unwrap();
    assert!(id_re.is_match(&id), "unexpected node id {}", id);

    run_json(tmp.path(), &["node", "add", "--label", "B", "--id", "b"]);
    let edge = run_json(tmp.path(), &["edge", "add", "--source", &id, "--target", "b"]);
    let edge_re = Regex::new(r"^edge_[0-9a-z]{26}$").unwrap();
    assert!(edge_re.is_match(edge["id"].as_str().unwrap()));
}

#[test]
fn undo_with_empty_history_reports_noop() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let undo = run_json(tmp.path(), &["undo"]);
    assert_eq!(undo["status"], "noop");
}

#[test]
fn edge_to_unknown_node_fails() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    run_json(tmp.path(), &["node", "add", "--id", "a"]);
    let out = run_auditflow(tmp.path(), &["edge", "add", "--source", "a", "--target", "ghost"]);
    assert!(!out.status.success());
}

#[test]
fn duplicate_and_delete_selection() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let dir = tmp.path();
    run_json(dir, &["node", "add", "--id", "a", "--x", "0", "--y", "0"]);
    run_json(dir, &["node", "add", "--id", "b", "--x", "100", "--y", "0"]);
    run_json(dir, &["edge", "add", "--source", "a", "--target", "b", "--id", "ab"]);

    let dup = run_json(dir, &["duplicate", "--node", "a", "--node", "b"]);
    assert_eq!(dup["node_ids"].as_array().unwrap().len(), 2);
    let shown = run_json(dir, &["show"]);
    assert_eq!(shown["document"]["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(shown["document"]["edges"].as_array().unwrap().len(), 2);

    let del = run_json(dir, &["delete-selection", "--node", "a"]);
    assert_eq!(del["nodes_removed"], 1);
    assert_eq!(del["edges_removed"], 1);

    let nothing = run_json(dir, &["delete-selection"]);
    assert_eq!(nothing["status"], "noop");
}

#[test]
fn template_apply_sets_project_and_recent() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let dir = tmp.path();

    let listed = run_json(dir, &["template", "list", "--category", "risk"]);
    let ids: Vec<&str> = listed["templates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["risk-decision-tree"]);

    let applied = run_json(dir, &["template", "apply", "risk-decision-tree"]);
    assert!(applied["nodes"].as_u64().unwrap() > 0);
    let shown = run_json(dir, &["show"]);
    assert_eq!(shown["document"]["projectName"], applied["project_name"]);

    let recent = run_json(dir, &["template", "list", "--recent"]);
    assert_eq!(recent["templates"][0]["id"], "risk-decision-tree");

    run_json(dir, &["template", "favorite", "risk-decision-tree"]);
    let favs = run_json(dir, &["template", "list", "--favorites"]);
    assert_eq!(favs["templates"].as_array().unwrap().len(), 1);

    let out = run_auditflow(dir, &["template", "delete", "risk-decision-tree"]);
    assert!(!out.status.success());
}

#[test]
fn save_and_delete_custom_template() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let dir = tmp.path();
    run_json(dir, &["node", "add", "--label", "Kickoff"]);
    let saved = run_json(dir, &["template", "save", "--name", "Kickoff flow"]);
    let id = saved["id"].as_str().unwrap().to_string();

    let found = run_json(dir, &["template", "search", "kickoff"]);
    assert_eq!(found["templates"][0]["id"], id.as_str());

    run_json(dir, &["template", "delete", &id]);
    let found = run_json(dir, &["template", "search", "kickoff"]);
    assert!(found["templates"].as_array().unwrap().is_empty());
}

#[test]
fn view_preferences_via_cli() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let dir = tmp.path();
    run_json(dir, &["view", "theme", "dark"]);
    run_json(dir, &["view", "set", "--grid-size", "25", "--render-mode", "raster"]);
    let view = run_json(dir, &["view", "show"]);
    assert_eq!(view["view"]["theme"]["name"], "dark");
    assert_eq!(view["view"]["grid"]["size"], 25);
    assert_eq!(view["view"]["renderMode"], "raster");

    let out = run_auditflow(dir, &["view", "theme", "neon"]);
    assert!(!out.status.success());
}

#[test]
fn reset_needs_yes_and_clears_history() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let dir = tmp.path();
    run_json(dir, &["node", "add", "--label", "A"]);

    let out = run_auditflow(dir, &["reset"]);
    assert!(!out.status.success());
    let shown = run_json(dir, &["show"]);
    assert_eq!(shown["document"]["nodes"].as_array().unwrap().len(), 1);

    run_json(dir, &["reset", "--yes"]);
    let shown = run_json(dir, &["show"]);
    assert!(shown["document"]["nodes"].as_array().unwrap().is_empty());
    assert_eq!(shown["history"]["pastCount"], 0);
}

#[test]
fn generate_uses_configured_delay() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let dir = tmp.path();
    fs::write(
        dir.join(".auditflow/auditflow.toml"),
        "[assistant]\nsimulated_delay_ms = 0\n",
    )
    .unwrap();

    let generated = run_json(dir, &["generate", "--prompt", "vendor review"]);
    assert_eq!(generated["applied"], true);
    assert!(
        generated["project_name"]
            .as_str()
            .unwrap()
            .contains("vendor review")
    );
}

#[test]
fn export_import_round_trip() {
    let src = tempdir().expect("tempdir");
    init(src.path());
    run_json(src.path(), &["node", "add", "--label", "Exported", "--id", "x"]);
    let file = src.path().join("doc.json");
    run_json(
        src.path(),
        &["export", "--out", file.to_str().expect("utf-8 path")],
    );

    let dst = tempdir().expect("tempdir");
    init(dst.path());
    let imported = run_json(
        dst.path(),
        &["import", "--file", file.to_str().expect("utf-8 path")],
    );
    assert_eq!(imported["nodes"], 1);
    let shown = run_json(dst.path(), &["show"]);
    assert_eq!(shown["document"]["nodes"][0]["id"], "x");

    let undo = run_json(dst.path(), &["undo"]);
    assert_eq!(undo["action"], "Import Document");
}

#[test]
fn journal_lists_recorded_operations() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    run_json(tmp.path(), &["node", "add", "--label", "A"]);
    let journal = run_json(tmp.path(), &["journal", "--limit", "50"]);
    let ops: Vec<&str> = journal["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["op"].as_str().unwrap())
        .collect();
    assert!(ops.contains(&"graph.add_node"));
    // Events recorded while loading the session reach the file too.
    assert!(ops.contains(&"restore.auditflow.diagram"));
    assert!(ops.contains(&"session.open"));
}

#[test]
fn node_add_with_one_coordinate_keeps_default_for_the_other() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    run_json(tmp.path(), &["node", "add", "--id", "a", "--x", "10"]);
    run_json(tmp.path(), &["node", "add", "--id", "b", "--y", "30"]);
    let shown = run_json(tmp.path(), &["show"]);
    let nodes = &shown["document"]["nodes"];
    assert_eq!(nodes[0]["position"]["x"], 10.0);
    assert_eq!(nodes[0]["position"]["y"], 100.0);
    assert_eq!(nodes[1]["position"]["x"], 100.0);
    assert_eq!(nodes[1]["position"]["y"], 30.0);
}

#[test]
fn import_with_repeated_node_ids_fails() {
    let tmp = tempdir().expect("tempdir");
    init(tmp.path());
    let file = tmp.path().join("dup.json");
    fs::write(
        &file,
        r#"{"nodes": [
            {"id": "a", "type": "process", "position": {"x": 0, "y": 0}, "data": {"label": "A"}},
            {"id": "a", "type": "process", "position": {"x": 0, "y": 0}, "data": {"label": "B"}}
        ], "edges": [], "projectId": "p1", "projectName": "Dup", "projectDescription": "",
        "lastModified": 0, "version": "1.0.0"}"#,
    )
    .unwrap();
    let out = run_auditflow(tmp.path(), &["import", "--file", file.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("repeats id 'a'"));
    let shown = run_json(tmp.path(), &["show"]);
    assert!(shown["document"]["nodes"].as_array().unwrap().is_empty());
}

#[test]
fn capabilities_lists_every_subsystem() {
    let tmp = tempdir().expect("tempdir");
    let caps = run_json(tmp.path(), &["capabilities"]);
    let names: Vec<&str> = caps["capabilities"]["subsystems"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    for expected in ["graph", "history", "view", "templates", "assistant"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
}
