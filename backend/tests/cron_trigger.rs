//! Integration coverage for the HTTP trigger surface over fully wired jobs.
//!
//! These tests exercise real Actix handlers with a real job wired over the
//! in-memory store, verifying both the happy path and that rejected requests
//! leave the store untouched.

use std::sync::Arc;

use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::Value;
use uuid::Uuid;

use rollcall_backend::domain::reminders::AutoCheckoutJob;
use rollcall_backend::domain::scheduler::Job;
use rollcall_backend::domain::user::{AUTO_CHECKOUT_GRACE_DAYS, CheckIn, User, UserEmail};
use rollcall_backend::inbound::http::state::HttpState;
use rollcall_backend::inbound::http::triggers;
use rollcall_backend::outbound::memory::InMemoryStore;
use rollcall_backend::outbound::notify::TracingNotifier;
use rollcall_backend::test_support::FixedClock;

fn store_with_overdue_member() -> InMemoryStore {
    let store = InMemoryStore::new();
    let mut member = User::new("Lena", "Kovac");
    member.emails.push(UserEmail {
        email: "lena@example.com".to_owned(),
        validated: true,
    });
    let mut departing = CheckIn::new(Uuid::new_v4());
    departing.checkout_date = Some(Utc::now() - TimeDelta::days(AUTO_CHECKOUT_GRACE_DAYS + 2));
    member.check_ins.operations.push(departing);
    store.seed_user(member);
    store
}

fn auto_checkout_job(store: &InMemoryStore) -> Arc<dyn Job> {
    Arc::new(AutoCheckoutJob::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(TracingNotifier),
        Arc::new(FixedClock::new(Utc::now())),
    ))
}

#[actix_web::test]
async fn a_triggered_job_runs_against_the_store_and_reports() {
    let store = store_with_overdue_member();
    let state = web::Data::new(HttpState::new("s3cret").register(auto_checkout_job(&store)));
    let app = test::init_service(App::new().app_data(state).configure(triggers::configure)).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/cron/auto-checkout?cron_key=s3cret")
            .to_request(),
    )
    .await;

    assert!(response.status().is_success());
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["job"], "auto-checkout");
    assert_eq!(body["details"]["closed"], 1);
    assert!(store.users()[0].check_ins.operations[0].checked_out);
}

#[actix_web::test]
async fn a_rejected_trigger_leaves_the_store_untouched() {
    let store = store_with_overdue_member();
    let state = web::Data::new(HttpState::new("s3cret").register(auto_checkout_job(&store)));
    let app = test::init_service(App::new().app_data(state).configure(triggers::configure)).await;

    for uri in [
        "/api/v1/cron/auto-checkout",
        "/api/v1/cron/auto-checkout?cron_key=wrong",
    ] {
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::UNAUTHORIZED,
            "{uri} must be rejected",
        );
    }

    assert!(
        !store.users()[0].check_ins.operations[0].checked_out,
        "rejected triggers must cause zero side effects",
    );
}
