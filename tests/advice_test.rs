//! Integration tests for savings advice and the goals plan.

mod common;

use axum::http::StatusCode;
use common::{days_ago, TestClient};

#[tokio::test]
async fn test_savings_advice_income_only() {
    let client = TestClient::new();
    client.create_transaction(&days_ago(3), 5000.0, "Salary", "income").await;

    let (status, body) = client.get_json("/api/advice/savings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "month");
    assert_eq!(body["range"]["start"], days_ago(29));
    assert_eq!(body["range"]["end"], days_ago(0));
    assert_eq!(body["current"]["income"], 5000.0);
    assert_eq!(body["current"]["net"], 5000.0);
    assert_eq!(body["targets"]["daily"], 166.67);
    assert_eq!(body["targets"]["weekly"], 1166.67);
    assert_eq!(body["targets"]["monthly"], 5000.0);
    assert_eq!(body["category_reductions"], serde_json::json!([]));
}

#[tokio::test]
async fn test_savings_advice_reductions() {
    let client = TestClient::new();
    let spend = [
        ("Rent", 1000.0),
        ("Food", 500.0),
        ("Fun", 400.0),
        ("Car", 300.0),
        ("Gym", 200.0),
        ("Books", 100.0),
    ];
    for (i, (category, amount)) in spend.iter().enumerate() {
        client
            .create_transaction(&days_ago(i as i64), -amount, category, "expense")
            .await;
    }
    // Outside the 30-day window
    client.create_transaction(&days_ago(45), -9999.0, "Rent", "expense").await;

    let (status, body) = client.get_json("/api/advice/savings?period=WEEK").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "week");
    assert_eq!(body["current"]["expenses"], 2500.0);

    let reductions = body["category_reductions"].as_array().unwrap();
    assert_eq!(reductions.len(), 5);

    let expected = [
        ("Rent", 10.0, 100.0),
        ("Food", 7.0, 35.0),
        ("Fun", 5.0, 20.0),
        ("Car", 3.0, 9.0),
        ("Gym", 3.0, 6.0),
    ];
    for (item, (category, pct, reduced)) in reductions.iter().zip(expected) {
        assert_eq!(item["category"], category);
        assert_eq!(item["suggested_reduction_pct"], pct);
        assert_eq!(item["reduced_amount"], reduced);
    }

    assert_eq!(body["targets"]["monthly"], -2330.0);
}

#[tokio::test]
async fn test_savings_advice_unknown_period_defaults_to_month() {
    let client = TestClient::new();
    let (status, body) = client.get_json("/api/advice/savings?period=year").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "month");
    assert_eq!(body["targets"]["daily"], 0.0);
}

#[tokio::test]
async fn test_goals_plan_without_net() {
    let client = TestClient::new();
    client.create_transaction(&days_ago(1), -50.0, "Food", "expense").await;
    client.create_goal("Laptop", 1500.0, 0.0, Some("2030-01-15")).await;
    client.create_goal("Trip", 800.0, 100.0, None).await;

    let (status, body) = client.get_json("/api/advice/goals-plan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseline"]["monthly_net"], -50.0);

    let goals = body["goals"].as_array().unwrap();
    assert_eq!(goals.len(), 2);
    for goal in goals {
        assert_eq!(goal["status"], "no_net");
        assert!(goal["months_to_target"].is_null());
        assert!(goal["projected_completion"].is_null());
    }
    assert_eq!(goals[1]["remaining"], 700.0);
}

#[tokio::test]
async fn test_goals_plan_projection() {
    let client = TestClient::new();
    client.create_transaction(&days_ago(2), 400.0, "Salary", "income").await;
    let id = client.create_goal("Emergency fund", 1200.0, 0.0, None).await;
    client.create_goal("Far away", 1200.0, 0.0, Some("2999-12-31")).await;
    client.create_goal("Already late", 1200.0, 0.0, Some("2001-01-31")).await;

    let (status, body) = client.get_json("/api/advice/goals-plan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseline"]["monthly_net"], 400.0);

    let goals = body["goals"].as_array().unwrap();
    assert_eq!(goals[0]["id"], id);
    assert_eq!(goals[0]["months_to_target"], 3.0);
    assert_eq!(goals[0]["status"], "on_track");

    let projected = goals[0]["projected_completion"].as_str().unwrap();
    assert!(projected.ends_with("-28"), "{projected}");

    assert_eq!(goals[1]["status"], "ahead");
    assert_eq!(goals[2]["status"], "behind");
}

#[tokio::test]
async fn test_goals_plan_projection_beyond_calendar() {
    let client = TestClient::new();
    client.create_transaction(&days_ago(1), 0.01, "Interest", "income").await;
    client.create_goal("Island", 1_000_000.0, 0.0, None).await;

    let (status, body) = client.get_json("/api/advice/goals-plan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["baseline"]["monthly_net"], 0.01);

    let goal = &body["goals"][0];
    assert_eq!(goal["months_to_target"], 100_000_000.0);
    assert!(goal["projected_completion"].is_null());
    assert_eq!(goal["status"], "on_track");
}
