// Integration tests for credrisk
use actix_web::{test as actix_test, web, App};
use credrisk::prelude::*;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

const SNAPSHOT: &str = "\
SK_ID_CURR,TARGET,CODE_GENDER,CNT_CHILDREN,DAYS_BIRTH,FLAG_OWN_CAR,FLAG_OWN_REALTY,DAYS_EMPLOYED,DAYS_REGISTRATION,AMT_INCOME_TOTAL,AMT_CREDIT,AMT_ANNUITY,PAYMENT_RATE,CREDIT_INCOME_PERCENT,EXT_SOURCE_1,EXT_SOURCE_2,EXT_SOURCE_3,NAME_EDUCATION_TYPE_Higher_education,NAME_FAMILY_STATUS_Married,NAME_INCOME_TYPE_Working
100001,0,0,1,-12000,1,1,-2000,-4000,180000,400000,20000,0.05,2.22,0.51,0.62,0.43,1,1,1
100002,0,1,0,-11500,0,1,-1800,-3500,175000,390000,19500,0.05,2.23,0.48,0.60,,1,1,1
100003,1,1,2,-9000,0,0,-300,-1000,60000,250000,25000,0.10,4.17,0.12,0.20,0.15,0,0,1
100004,0,0,3,-15000,1,1,-5000,-6000,220000,500000,22000,0.044,2.27,0.70,0.75,0.66,1,1,1
100005,1,0,0,-8500,0,0,-200,-800,55000,240000,24000,0.10,4.36,,0.18,0.11,0,0,1
100006,0,1,1,-13000,1,0,-3000,-5000,190000,420000,20500,0.049,2.21,0.55,0.65,0.50,1,1,1
";

fn write_fixtures() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();

    let data_path = dir.path().join("clients.csv.gz");
    let mut encoder = GzEncoder::new(
        std::fs::File::create(&data_path).unwrap(),
        Compression::default(),
    );
    encoder.write_all(SNAPSHOT.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let model_path = dir.path().join("model.json");
    let model = serde_json::json!({
        "feature_names": ["AMT_INCOME_TOTAL", "EXT_SOURCE_2"],
        "init_score": -1.0,
        "trees": [
            { "nodes": [
                { "feature": 0, "threshold": 150000.0, "left": 1, "right": 2 },
                { "value": 0.9 },
                { "value": -0.5 }
            ]},
            { "nodes": [
                { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": 0.4 },
                { "value": -0.3 }
            ]}
        ]
    });
    std::fs::write(&model_path, model.to_string()).unwrap();

    (dir, data_path, model_path)
}

fn build_context(k: usize) -> (tempfile::TempDir, Arc<AppContext>) {
    let (dir, data_path, model_path) = write_fixtures();
    let store = FeatureStore::load(&data_path, &model_path).unwrap();
    let ctx = AppContext::build(store, k, 0.5).unwrap();
    (dir, Arc::new(ctx))
}

#[test]
fn test_feature_store_load() {
    let (_dir, data_path, model_path) = write_fixtures();
    let store = FeatureStore::load(&data_path, &model_path).unwrap();

    assert_eq!(store.dataset().len(), 6);
    assert_eq!(store.dataset().feature_columns().len(), 18);
    assert_eq!(store.model().num_trees(), 2);
}

#[test]
fn test_neighbors_exclude_self_and_sort() {
    let (_dir, ctx) = build_context(3);

    for &id in ctx.dataset().ids() {
        let neighbors = ctx.index().neighbors(id).unwrap();
        assert_eq!(neighbors.len(), 3);
        assert!(neighbors.iter().all(|n| n.client_id != id));
        for pair in neighbors.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn test_similar_profiles_rank_first() {
    // 100003 and 100005 are the two low-income defaulters; after
    // standardization they should be each other's closest neighbor.
    let (_dir, ctx) = build_context(2);

    let neighbors = ctx.index().neighbors(100003).unwrap();
    assert_eq!(neighbors[0].client_id, 100005);
}

#[test]
fn test_rebuild_is_deterministic() {
    let (_dir1, ctx1) = build_context(4);
    let (_dir2, ctx2) = build_context(4);

    for &id in ctx1.dataset().ids() {
        assert_eq!(
            ctx1.index().neighbors(id).unwrap(),
            ctx2.index().neighbors(id).unwrap()
        );
    }
}

#[test]
fn test_k_equals_population_minus_one() {
    let (_dir, ctx) = build_context(5);
    let neighbors = ctx.index().neighbors(100001).unwrap();
    assert_eq!(neighbors.len(), 5);
}

#[test]
fn test_unknown_client_is_not_found() {
    let (_dir, ctx) = build_context(2);
    let err = ctx.index().neighbors(999999).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_too_many_neighbors_refused_at_startup() {
    let (_dir, data_path, model_path) = write_fixtures();
    let store = FeatureStore::load(&data_path, &model_path).unwrap();
    assert!(AppContext::build(store, 6, 0.5).is_err());
}

#[actix_web::test]
async fn test_rest_clients_and_prediction() {
    let (_dir, ctx) = build_context(3);
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(ctx))
            .configure(credrisk_api::rest::configure),
    )
    .await;

    let req = actix_test::TestRequest::get().uri("/api/clients").to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["clientsID"].as_array().unwrap().len(), 6);

    // Low-income client: raw = -1.0 + 0.9 + 0.4 = 0.3, above the 0.5
    // probability threshold, so the loan is declined.
    let req = actix_test::TestRequest::get()
        .uri("/api/clients/100003/prediction")
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
    let p0 = body["probability0"].as_f64().unwrap();
    let p1 = body["probability1"].as_f64().unwrap();
    assert!((p0 + p1 - 1.0).abs() < 1e-9);
    assert!(p1 > 0.5);
    assert_eq!(body["repay"], "No");
    assert_eq!(body["score"].as_i64().unwrap(), (p0 * 1000.0).round() as i64);

    // High-income client: raw = -1.0 - 0.5 - 0.3 = -1.8, accepted.
    let req = actix_test::TestRequest::get()
        .uri("/api/clients/100004/prediction")
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["repay"], "Yes");
}

#[actix_web::test]
async fn test_rest_unknown_client_404() {
    let (_dir, ctx) = build_context(3);
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(ctx))
            .configure(credrisk_api::rest::configure),
    )
    .await;

    for uri in [
        "/api/clients/42/personal_information",
        "/api/clients/42/bank_information",
        "/api/clients/42/prediction",
        "/api/clients/42/similar_clients",
    ] {
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404, "{uri}");
    }
}

#[actix_web::test]
async fn test_rest_similar_clients_aggregates() {
    let (_dir, ctx) = build_context(3);
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(ctx))
            .configure(credrisk_api::rest::configure),
    )
    .await;

    let req = actix_test::TestRequest::get()
        .uri("/api/clients/100001/similar_clients")
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

    let neighbors = body["neighbors"].as_array().unwrap();
    assert_eq!(neighbors.len(), 3);
    assert!(neighbors.iter().all(|n| n["clientId"] != 100001));

    let repaid = body["outcomes"]["repaid"].as_u64().unwrap();
    let defaulted = body["outcomes"]["defaulted"].as_u64().unwrap();
    assert_eq!(repaid + defaulted, 3);

    let income = &body["income"];
    assert!(income["min"].as_f64().unwrap() <= income["mean"].as_f64().unwrap());
    assert!(income["mean"].as_f64().unwrap() <= income["max"].as_f64().unwrap());
}

#[actix_web::test]
async fn test_rest_statistics() {
    let (_dir, ctx) = build_context(3);
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(ctx))
            .configure(credrisk_api::rest::configure),
    )
    .await;

    let req = actix_test::TestRequest::get()
        .uri("/api/statistics/loans")
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["repaid"], 4);
    assert_eq!(body["defaulted"], 2);

    let req = actix_test::TestRequest::get()
        .uri("/api/statistics/total_incomes")
        .to_request();
    let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["100003"][0], 60000.0);
    assert_eq!(body["100003"][1], "defaulted");
    assert_eq!(body["100001"][1], "repaid");
}
