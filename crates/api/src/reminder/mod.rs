mod appointment_written;
pub mod execute_reminder_task;
mod plan_appointment_reminders;
mod resolve_reminder_offsets;
mod send_reminder_notification;
pub mod sweep_appointment_reminders;

use actix_web::web;
use appointment_written::appointment_written_controller;
use execute_reminder_task::execute_reminder_task_controller;
use sweep_appointment_reminders::sweep_appointment_reminders_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/tasks/reminders",
        web::post().to(execute_reminder_task_controller),
    );
    cfg.route(
        "/appointments/written",
        web::post().to(appointment_written_controller),
    );
    cfg.route(
        "/sweeps",
        web::post().to(sweep_appointment_reminders_controller),
    );
}
