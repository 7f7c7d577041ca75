mod helpers;

use helpers::setup::{spawn_app, TestApp};
use reminder_scheduler_api_structs::dtos::{PlanOutcomeDTO, TaskOutcomeDTO};
use reminder_scheduler_api_structs::{
    appointment_written, execute_reminder_task, get_service_health,
    sweep_appointment_reminders,
};
use reminder_scheduler_domain::{Appointment, AppointmentRef, Client, OutboxStatus};
use serde_json::{json, Value};

const HOUR: i64 = 1000 * 60 * 60;

fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

async fn save_appointment(app: &TestApp, path: &str, doc: Value) -> AppointmentRef {
    let reference: AppointmentRef = path.parse().unwrap();
    let appointment: Appointment = serde_json::from_value(doc).unwrap();
    app.ctx
        .repos
        .appointments
        .save(&reference, &appointment)
        .await
        .unwrap();
    reference
}

async fn seed_tenant(app: &TestApp) {
    app.ctx
        .repos
        .tenant_settings
        .save("t1", &json!({ "appointmentOffsetsMinutes": [60] }))
        .await
        .unwrap();
    app.ctx
        .repos
        .clients
        .save(&Client::new("c1", vec!["tok".into()]))
        .await
        .unwrap();
}

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let app = spawn_app().await;
    let res = app
        .client
        .get(&app.url("/"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(res.status().is_success());
    let body = res.json::<get_service_health::APIResponse>().await.unwrap();
    assert!(!body.message.is_empty());
}

#[actix_web::main]
#[test]
async fn test_internal_routes_require_key() {
    let app = spawn_app().await;
    let requests = vec![
        (
            "/tasks/reminders",
            json!({
                "tenantId": "t1",
                "appointmentId": "a1",
                "appointmentRef": "tenants/t1/appointments/a1",
                "offsetId": "M60",
            }),
        ),
        (
            "/appointments/written",
            json!({ "appointmentRef": "tenants/t1/appointments/a1" }),
        ),
        ("/sweeps", json!({})),
    ];
    for (path, body) in requests {
        let res = app
            .client
            .post(&app.url(path))
            .header("reminders-internal-key", "wrong")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(res.status().as_u16(), 401);
    }
}

#[actix_web::main]
#[test]
async fn test_appointment_written_plans_reminders() {
    let app = spawn_app().await;
    seed_tenant(&app).await;
    save_appointment(
        &app,
        "tenants/t1/appointments/a1",
        json!({ "start": now() + 5 * HOUR, "clientId": "c1" }),
    )
    .await;

    let res = app
        .post(
            "/appointments/written",
            json!({ "appointmentRef": "tenants/t1/appointments/a1" }),
        )
        .await;
    assert!(res.status().is_success());
    let body = res.json::<appointment_written::APIResponse>().await.unwrap();
    assert_eq!(
        body.result,
        appointment_written::WriteOutcomeDTO::Planned {
            plan: PlanOutcomeDTO::Scheduled {
                tenant_id: "t1".into(),
                offset_ids: vec!["M60".into()],
            }
        }
    );

    let res = app
        .post(
            "/appointments/written",
            json!({ "appointmentRef": "appointments/missing" }),
        )
        .await;
    let body = res.json::<appointment_written::APIResponse>().await.unwrap();
    assert_eq!(
        body.result,
        appointment_written::WriteOutcomeDTO::AppointmentNotFound
    );
}

#[actix_web::main]
#[test]
async fn test_execute_reminder_task_sends_once() {
    let app = spawn_app().await;
    seed_tenant(&app).await;
    let reference = save_appointment(
        &app,
        "tenants/t1/appointments/a2",
        json!({ "startAt": now() + 2 * HOUR, "clientId": "c1", "title": "Taglio" }),
    )
    .await;

    let task = json!({
        "tenantId": "t1",
        "appointmentId": "a2",
        "appointmentRef": "tenants/t1/appointments/a2",
        "offsetId": "M90",
        "offsetMinutes": 90,
    });
    let res = app.post("/tasks/reminders", task.clone()).await;
    assert!(res.status().is_success());
    let body = res.json::<execute_reminder_task::APIResponse>().await.unwrap();
    match body.result {
        TaskOutcomeDTO::Sent { report } => {
            assert_eq!(report.client_id.as_deref(), Some("c1"));
            assert_eq!(report.token_count, 1);
            assert_eq!(report.status, OutboxStatus::Sent);
        }
        other => panic!("Expected the reminder to be sent, got {:?}", other),
    }

    let stored = app
        .ctx
        .repos
        .appointments
        .find(&reference)
        .await
        .unwrap()
        .expect("Appointment to exist");
    assert!(stored.has_sent_flag("M90"));

    let res = app.post("/tasks/reminders", task).await;
    let body = res.json::<execute_reminder_task::APIResponse>().await.unwrap();
    assert_eq!(body.result, TaskOutcomeDTO::AlreadySent);
}

#[actix_web::main]
#[test]
async fn test_malformed_task_is_rejected() {
    let app = spawn_app().await;
    let res = app
        .post(
            "/tasks/reminders",
            json!({ "tenantId": "t1", "appointmentRef": "clients/c1" }),
        )
        .await;
    assert_eq!(res.status().as_u16(), 400);
}

#[actix_web::main]
#[test]
async fn test_sweep_reports_scanned_appointments() {
    let app = spawn_app().await;
    seed_tenant(&app).await;
    save_appointment(
        &app,
        "tenants/t1/appointments/a3",
        json!({ "start": now() + 3 * HOUR }),
    )
    .await;
    save_appointment(
        &app,
        "tenants/t1/appointments/a4",
        json!({ "start": now() + 4 * HOUR, "status": "cancelled" }),
    )
    .await;

    let res = app.post("/sweeps", json!({})).await;
    assert!(res.status().is_success());
    let body = res
        .json::<sweep_appointment_reminders::APIResponse>()
        .await
        .unwrap();
    assert_eq!(body.report.scanned, 2);
    assert_eq!(body.report.planned, 1);
    assert_eq!(body.report.skipped_cancelled, 1);
    assert_eq!(body.report.skipped_incomplete, 0);
}
