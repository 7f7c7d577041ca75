use super::IAppointmentRepo;
use crate::repos::shared::inmemory_repo::*;
use reminder_scheduler_domain::{
    Appointment, AppointmentRef, AppointmentSnapshot, Entity, StartField,
};
use std::sync::Mutex;

#[derive(Clone)]
struct StoredAppointment {
    path: String,
    snapshot: AppointmentSnapshot,
}

impl Entity for StoredAppointment {
    fn id(&self) -> &str {
        &self.path
    }
}

pub struct InMemoryAppointmentRepo {
    appointments: Mutex<Vec<StoredAppointment>>,
}

impl InMemoryAppointmentRepo {
    pub fn new() -> Self {
        Self {
            appointments: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IAppointmentRepo for InMemoryAppointmentRepo {
    async fn save(
        &self,
        reference: &AppointmentRef,
        appointment: &Appointment,
    ) -> anyhow::Result<()> {
        let stored = StoredAppointment {
            path: reference.path(),
            snapshot: AppointmentSnapshot {
                reference: reference.clone(),
                appointment: appointment.clone(),
            },
        };
        upsert(&stored, &self.appointments);
        Ok(())
    }

    async fn find(&self, reference: &AppointmentRef) -> anyhow::Result<Option<Appointment>> {
        Ok(find(&reference.path(), &self.appointments).map(|s| s.snapshot.appointment))
    }

    async fn mark_sent_if_unset(
        &self,
        reference: &AppointmentRef,
        offset_id: &str,
    ) -> anyhow::Result<bool> {
        let path = reference.path();
        let marked = update_one(
            &self.appointments,
            |s| s.path == path,
            |s| {
                let appointment = &mut s.snapshot.appointment;
                if appointment.has_sent_flag(offset_id) {
                    false
                } else {
                    appointment.set_sent_flag(offset_id);
                    true
                }
            },
        );
        Ok(marked.unwrap_or(false))
    }

    async fn find_starting_between(
        &self,
        field: StartField,
        from: i64,
        to: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<AppointmentSnapshot>> {
        let mut snapshots = find_by(&self.appointments, |s| {
            match s.snapshot.appointment.start_value(field) {
                Some(start) => start >= from && start <= to,
                None => false,
            }
        })
        .into_iter()
        .map(|s| s.snapshot)
        .collect::<Vec<_>>();
        snapshots.truncate(limit);
        Ok(snapshots)
    }
}
