use aichemy_testing::{TestWorld, assertions};

#[test]
fn test_project_lifecycle() {
    let world = TestWorld::new();

    let created = world
        .run_json(&["project", "create", "Kinase work"])
        .expect("Failed to create");
    assert!(created.success(), "create failed: {}", created.stderr());
    let json = created.json().expect("Parse failed");
    assert_eq!(json["content"]["action"], "Created");
    assert_eq!(json["content"]["name"], "Kinase work");
    let id = json["content"]["id"].as_str().unwrap().to_string();

    let list = world.run_json(&["project", "list"]).unwrap();
    let json = list.json().unwrap();
    assertions::assert_project_count(&json, 1).unwrap();
    assert_eq!(assertions::first_project_id(&json).unwrap(), id);

    let renamed = world
        .run(&["project", "rename", &id[..8], "EGFR notes"])
        .unwrap();
    assert!(renamed.success(), "rename failed: {}", renamed.stderr());
    assert!(
        renamed
            .stdout()
            .contains(&format!("Renamed project EGFR notes ({})", id))
    );

    let shown = world.run(&["project", "show", &id]).unwrap();
    assert!(shown.stdout().contains(&format!("Project: EGFR notes ({})", id)));
    assert!(shown.stdout().contains("(no messages)"));

    let deleted = world.run(&["project", "delete", &id]).unwrap();
    assert!(deleted.success());
    assert!(deleted.stdout().contains(&format!("Deleted project {}", id)));

    let list = world.run_json(&["project", "list"]).unwrap();
    assertions::assert_project_count(&list.json().unwrap(), 0).unwrap();
}

#[test]
fn test_list_orders_most_recent_first() {
    let world = TestWorld::new();
    world.run(&["project", "create", "older"]).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(20));
    world.run(&["project", "create", "newer"]).unwrap();

    let list = world.run_json(&["project", "list"]).unwrap();
    let json = list.json().unwrap();
    assert_eq!(json["content"]["projects"][0]["name"], "newer");
    assert_eq!(json["content"]["projects"][1]["name"], "older");
}

#[test]
fn test_empty_list_plain_output() {
    let world = TestWorld::new();

    let result = world.run(&["project", "list"]).unwrap();
    assert!(result.success());
    assert!(result.stdout().contains("No projects yet."));
    assert!(result.stdout().contains("aichemy chat"));
}

#[test]
fn test_blank_name_rejected() {
    let world = TestWorld::new();

    let result = world.run(&["project", "create", "   "]).unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("project name cannot be empty"));
}

#[test]
fn test_projects_are_scoped_to_owner() {
    let world = TestWorld::new();
    world.run(&["project", "create", "mine"]).unwrap();

    let result = world.run_json(&["project", "list"]).unwrap();
    assertions::assert_project_count(&result.json().unwrap(), 1).unwrap();

    let config = "[conversation]\nowner_id = \"someone-else\"\n";
    std::fs::write(world.data_dir().join("config.toml"), config).unwrap();
    let result = world.run_json(&["project", "list"]).unwrap();
    assertions::assert_project_count(&result.json().unwrap(), 0).unwrap();
}
