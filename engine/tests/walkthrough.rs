//! End-to-end walks through the five phases.

use vantage_config::{Settings, VantageConfig};
use vantage_engine::{
    AuditAction, Calibration, Classification, ErrorKind, ExpansionOutcome, Mode, NodeType, PathId,
    Phase, VantageService,
};

fn standalone_service() -> VantageService {
    VantageService::with_defaults(Settings::resolve_with(None, |_| None))
}

fn calibration() -> Calibration {
    Calibration {
        what_wrong: "CI flaky".to_string(),
        how_long: "3 months".to_string(),
        what_right: "green builds on every merge".to_string(),
    }
}

#[tokio::test]
async fn provocation_reaches_expedition() {
    let service = standalone_service();
    let id = service.start("deploys break").unwrap().id().clone();

    let statement = service.calibrate(&id, calibration()).await.unwrap();
    assert!(statement.starts_with("Friction: deploys break. Specifically: CI flaky."));
    assert_eq!(
        service.complete_provocation(&id).await.unwrap(),
        Phase::Expedition
    );
    assert_eq!(service.snapshot(&id).await.unwrap().phase(), Phase::Expedition);
}

#[tokio::test]
async fn skipping_a_phase_names_the_expected_one() {
    let service = standalone_service();
    let id = service.start("deploys break").unwrap().id().clone();

    let err = service.advance_phase(&id, Phase::Vantage).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert!(err.to_string().contains("expected: expedition"));
}

#[tokio::test]
async fn full_standalone_walk_produces_verified_receipt() {
    let service = standalone_service();
    let id = service.start("deploys break").unwrap().id().clone();

    service.calibrate(&id, calibration()).await.unwrap();
    service.complete_provocation(&id).await.unwrap();

    let outcome = service.expand(&id, Some("pipeline")).await.unwrap();
    assert!(matches!(outcome, ExpansionOutcome::Manual { .. }));

    let ground = service
        .add_node(&id, "Jenkins is stable", NodeType::Ground, None)
        .await
        .unwrap();
    let convention = service
        .add_node(&id, "staging is required", NodeType::Convention, Some(0.4))
        .await
        .unwrap();
    service
        .add_node(&id, "why merges collide", NodeType::Unknown, None)
        .await
        .unwrap();
    let snapshot = service.snapshot(&id).await.unwrap();
    assert!((snapshot.threshold() - 0.333).abs() < f64::EPSILON);

    service
        .add_edge(&id, ground.id, convention.id, None)
        .await
        .unwrap();
    service.flag_significant(&id, convention.id).await.unwrap();
    service
        .classify_assumption(&id, "staging is required", Classification::Convention, "")
        .await
        .unwrap();
    service.advance_phase(&id, Phase::Vantage).await.unwrap();

    let summary = service.consolidate(&id).await.unwrap();
    assert_eq!(summary.territory_covered, 3);
    service.verify_discovery(&id, 0).await.unwrap();
    service.set_goal(&id, "merge to prod daily").await.unwrap();
    service.complete_vantage(&id).await.unwrap();

    let paths = service.generate_paths(&id).await.unwrap();
    assert_eq!(paths.get(PathId::A).assumptions, ["staging is required"]);
    service.commit_path(&id, PathId::C).await.unwrap();

    let receipt = service.generate_receipt(&id).await.unwrap();
    assert_eq!(receipt.chosen_path, Some(PathId::C));
    assert!(receipt.chain.chain_verified);
    assert_eq!(receipt.mode, Mode::Standalone);
    assert_eq!(receipt.territory.nodes, 3);
    assert_eq!(receipt.paths.len(), 3);
    assert!(receipt.discoveries[0].verified);
    assert!(
        receipt
            .chain
            .chain_id
            .starts_with(&format!("vantagepoint/vp_{}", &id.as_str()[..8]))
    );

    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["chosen_path"], "C");
    assert_eq!(json["chain"]["chain_verified"], true);
    assert_eq!(json["audit_log"][0]["action"], "calibrated");

    let after = service.snapshot(&id).await.unwrap();
    assert_eq!(after.phase(), Phase::Receipt);
    assert_eq!(
        after.audit_log().len(),
        receipt.audit_log.len() + 1,
        "receipt_generated is appended after assembly"
    );
}

#[tokio::test]
async fn return_to_expedition_allows_another_pass() {
    let service = standalone_service();
    let id = service.start("deploys break").unwrap().id().clone();
    service.calibrate(&id, calibration()).await.unwrap();
    service.complete_provocation(&id).await.unwrap();

    let err = service.return_to_expedition(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    service.advance_phase(&id, Phase::Vantage).await.unwrap();
    assert_eq!(
        service.return_to_expedition(&id).await.unwrap(),
        Phase::Expedition
    );
    assert_eq!(
        service.advance_phase(&id, Phase::Vantage).await.unwrap(),
        Phase::Vantage
    );
}

#[tokio::test]
async fn commit_unknown_path_before_generation_is_not_found() {
    let service = standalone_service();
    let id = service.start("deploys break").unwrap().id().clone();
    let err = service.commit_path(&id, PathId::B).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(service.snapshot(&id).await.unwrap().phase(), Phase::Provocation);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let service = standalone_service();
    let first = service.start("first").unwrap().id().clone();
    let second = service.start("second").unwrap().id().clone();
    service
        .add_node(&first, "only here", NodeType::Ground, None)
        .await
        .unwrap();
    assert!(service
        .snapshot(&second)
        .await
        .unwrap()
        .territory()
        .nodes()
        .is_empty());
}

#[tokio::test]
async fn configured_chain_name_scopes_the_receipt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[chain]\nname = \"team-chain\"\n").unwrap();
    let config = VantageConfig::load_from(&path).unwrap().unwrap();
    let settings = Settings::resolve_with(Some(&config), |_| None);
    assert_eq!(settings.chain_name, "team-chain");

    let service = VantageService::with_defaults(settings);
    let id = service.start("deploys break").unwrap().id().clone();
    let receipt = service.generate_receipt(&id).await.unwrap();

    assert!(
        receipt
            .chain
            .chain_id
            .starts_with(&format!("team-chain/vp_{}-", id.short()))
    );
    assert!(receipt.chain.chain_verified);
}

#[tokio::test]
async fn generating_paths_records_one_event() {
    let service = standalone_service();
    let id = service.start("deploys break").unwrap().id().clone();
    service.set_goal(&id, "ship daily").await.unwrap();
    let before = service.snapshot(&id).await.unwrap().audit_log().len();

    service.generate_paths(&id).await.unwrap();

    let session = service.snapshot(&id).await.unwrap();
    let log = session.audit_log();
    assert_eq!(log.len(), before + 1);
    assert!(matches!(
        log.last().unwrap().action,
        AuditAction::PathsGenerated { count: 3 }
    ));
}
