use aichemy_testing::TestWorld;

#[test]
fn test_dry_run_prints_tool_directed_prompt() {
    let world = TestWorld::new();

    let result = world
        .run(&["workflow", "target", "breast", "cancer", "--dry-run"])
        .unwrap();
    assert!(result.success(), "workflow failed: {}", result.stderr());
    assert!(result.stdout().starts_with(
        "Use OpenTargets and optionally PubChem to Find targets associated with breast cancer.\n"
    ));
}

#[test]
fn test_dry_run_with_skills_tags_the_request() {
    let world = TestWorld::new();

    let result = world
        .run_json(&["workflow", "safety", "danuglipron", "--skills", "--dry-run"])
        .unwrap();
    let json = result.json().unwrap();
    assert_eq!(json["content"]["workflow"], "safety-assessment");
    assert_eq!(json["content"]["skill"], "safety-assessment");
    assert_eq!(
        json["content"]["prompt"],
        "Find safety profile of danuglipron. If citing studies, please state the strength of the evidence based on the study design."
    );
}

#[test]
fn test_adme_properties() {
    let world = TestWorld::new();

    let result = world
        .run_json(&["workflow", "adme", "aspirin", "--property", "structure,bioactivity", "--dry-run"])
        .unwrap();
    let json = result.json().unwrap();
    assert_eq!(
        json["content"]["prompt"],
        "Use PubChem to Get properties of aspirin. Properties include Structure: SMILES, InChI, MW..., Bioactivity: IC50...."
    );
    assert!(json["content"].get("skill").is_none());

    let defaulted = world
        .run_json(&["workflow", "adme", "aspirin", "--dry-run"])
        .unwrap();
    assert_eq!(
        defaulted.json().unwrap()["content"]["prompt"],
        "Use PubChem to Get properties of aspirin. Properties include All."
    );
}

#[test]
fn test_skills_enabled_from_config() {
    let world = TestWorld::new().with_config("[conversation]\nskills_enabled = true\n");

    let result = world
        .run_json(&["workflow", "hit", "BRCA1", "--dry-run"])
        .unwrap();
    let json = result.json().unwrap();
    assert_eq!(json["content"]["prompt"], "Find drugs associated with BRCA1.");
    assert_eq!(json["content"]["skill"], "hit-identification");
}

#[test]
fn test_workflow_sends_through_agent() {
    let world = TestWorld::new();

    let result = world
        .run(&["--mock", "workflow", "hit", "GLP-1"])
        .unwrap();
    assert!(result.success(), "workflow failed: {}", result.stderr());
    assert!(result.stdout().contains("[mock] You asked: \"Use OpenTargets to Find drugs associated with GLP-1."));

    let list = world.run_json(&["project", "list"]).unwrap();
    let id = aichemy_testing::assertions::first_project_id(&list.json().unwrap()).unwrap();
    let show = world.run(&["project", "show", &id]).unwrap();
    assert!(show.stdout().contains("You: Use OpenTargets to Find drugs associated with GLP-1."));
}
