mod inmemory;
mod postgres;

pub use inmemory::InMemoryAppointmentRepo;
pub use postgres::PostgresAppointmentRepo;
use reminder_scheduler_domain::{Appointment, AppointmentRef, AppointmentSnapshot, StartField};

#[async_trait::async_trait]
pub trait IAppointmentRepo: Send + Sync {
    async fn save(&self, reference: &AppointmentRef, appointment: &Appointment)
        -> anyhow::Result<()>;
    /// A stored document that is not a json object reads as missing
    async fn find(&self, reference: &AppointmentRef) -> anyhow::Result<Option<Appointment>>;
    /// Sets the sent-flag of the offset only if it is not already set.
    /// Returns `true` when this call set the flag and `false` when it was
    /// already set or the appointment no longer exists.
    async fn mark_sent_if_unset(
        &self,
        reference: &AppointmentRef,
        offset_id: &str,
    ) -> anyhow::Result<bool>;
    /// Appointments of all tenants where `field` is within `[from, to]`
    async fn find_starting_between(
        &self,
        field: StartField,
        from: i64,
        to: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<AppointmentSnapshot>>;
}

#[cfg(test)]
mod tests {
    use crate::ReminderContext;
    use reminder_scheduler_domain::{Appointment, AppointmentRef, StartField};

    fn appointment(start_at: Option<i64>, start: Option<i64>) -> Appointment {
        Appointment {
            id: "a1".into(),
            start_at,
            start,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn marks_sent_flags_once() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.appointments;
        let r: AppointmentRef = "tenants/t1/appointments/a1".parse().unwrap();
        repo.save(&r, &appointment(Some(1000), None)).await.unwrap();

        assert!(repo.mark_sent_if_unset(&r, "M60").await.unwrap());
        assert!(!repo.mark_sent_if_unset(&r, "M60").await.unwrap());
        assert!(repo.mark_sent_if_unset(&r, "M180").await.unwrap());

        let stored = repo.find(&r).await.unwrap().expect("To find appointment");
        assert!(stored.has_sent_flag("M60"));
        assert!(stored.has_sent_flag("M180"));

        let missing: AppointmentRef = "appointments/nope".parse().unwrap();
        assert!(!repo.mark_sent_if_unset(&missing, "M60").await.unwrap());
    }

    #[tokio::test]
    async fn finds_by_start_field() {
        let ctx = ReminderContext::create_inmemory();
        let repo = &ctx.repos.appointments;
        let r1: AppointmentRef = "tenants/t1/appointments/a1".parse().unwrap();
        let r2: AppointmentRef = "appointments/a2".parse().unwrap();
        let r3: AppointmentRef = "appointments/a3".parse().unwrap();
        repo.save(&r1, &appointment(Some(100), Some(100))).await.unwrap();
        repo.save(&r2, &appointment(None, Some(200))).await.unwrap();
        repo.save(&r3, &appointment(Some(900), None)).await.unwrap();

        let res = repo
            .find_starting_between(StartField::Start, 0, 500, 10)
            .await
            .unwrap();
        assert_eq!(res.len(), 2);
        let res = repo
            .find_starting_between(StartField::StartAt, 0, 500, 10)
            .await
            .unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].reference, r1);
        let res = repo
            .find_starting_between(StartField::Start, 0, 500, 1)
            .await
            .unwrap();
        assert_eq!(res.len(), 1);
    }
}
