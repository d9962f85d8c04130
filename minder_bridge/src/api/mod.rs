//! Typed surface of the time tracking backend.

pub mod operations;
mod timer;
pub mod types;

use std::sync::Arc;

pub use timer::{TimerBroker, TimerTicks};
pub use types::*;

use crate::{boundary::Boundary, correlation::CorrelationId, error::BridgeResult};
use operations::*;

// -------------------------------------------------------------------------------------------------------

/// One method per backend call. Cloning shares the boundary.
#[derive(Clone, Debug)]
pub struct Api {
    boundary: Arc<Boundary>,
}

impl Api {
    pub fn new(boundary: Arc<Boundary>) -> Self {
        Api { boundary }
    }

    pub fn boundary(&self) -> &Arc<Boundary> {
        &self.boundary
    }

    pub fn timer(&self) -> TimerBroker {
        TimerBroker::new(self.boundary.clone())
    }

    pub async fn info(&self, message: impl Into<String>) -> BridgeResult<()> {
        self.boundary
            .call(Info {
                message: Some(message.into()),
            })
            .await
    }

    pub async fn title_set(&self, new_title: impl Into<String>) -> BridgeResult<()> {
        self.boundary
            .call(TitleSet {
                new_title: new_title.into(),
            })
            .await
    }

    // clients

    pub async fn client_create(&self, name: impl Into<String>) -> BridgeResult<Client> {
        self.boundary.call(ClientCreate { name: name.into() }).await
    }

    pub async fn clients_list(&self) -> BridgeResult<Vec<Client>> {
        self.boundary.call(ClientsList).await
    }

    pub async fn client_list_active(&self) -> BridgeResult<Vec<Client>> {
        self.boundary.call(ClientListActive).await
    }

    pub async fn client_get(&self, client_id: RecordId) -> BridgeResult<Option<Client>> {
        self.boundary.call(ClientGet { client_id }).await
    }

    pub async fn client_update(
        &self,
        client_id: RecordId,
        client_name: impl Into<String>,
    ) -> BridgeResult<Option<Client>> {
        self.boundary
            .call(ClientUpdate {
                client_id,
                client_name: client_name.into(),
            })
            .await
    }

    pub async fn client_destroy(&self, client_id: RecordId) -> BridgeResult<bool> {
        self.boundary.call(ClientDestroy { client_id }).await
    }

    // projects

    pub async fn project_create(
        &self,
        client_id: RecordId,
        name: impl Into<String>,
    ) -> BridgeResult<Project> {
        self.boundary
            .call(ProjectCreate {
                client_id,
                name: name.into(),
            })
            .await
    }

    pub async fn projects_list_by_client_id(
        &self,
        client_id: RecordId,
    ) -> BridgeResult<Vec<Project>> {
        self.boundary.call(ProjectsListByClientId { client_id }).await
    }

    pub async fn projects_list_active_by_client_id(
        &self,
        client_id: RecordId,
    ) -> BridgeResult<Vec<Project>> {
        self.boundary
            .call(ProjectsListActiveByClientId { client_id })
            .await
    }

    pub async fn project_get(&self, project_id: RecordId) -> BridgeResult<Option<Project>> {
        self.boundary.call(ProjectGet { project_id }).await
    }

    pub async fn project_update(
        &self,
        project_id: RecordId,
        project_name: impl Into<String>,
    ) -> BridgeResult<Option<Project>> {
        self.boundary
            .call(ProjectUpdate {
                project_id,
                project_name: project_name.into(),
            })
            .await
    }

    pub async fn project_set_status(
        &self,
        project_id: RecordId,
        status: bool,
    ) -> BridgeResult<Project> {
        self.boundary
            .call(ProjectSetStatus { project_id, status })
            .await
    }

    pub async fn project_destroy(&self, project_id: RecordId) -> BridgeResult<bool> {
        self.boundary.call(ProjectDestroy { project_id }).await
    }

    // tasks

    pub async fn task_create(
        &self,
        project_id: RecordId,
        name: impl Into<String>,
    ) -> BridgeResult<Task> {
        self.boundary
            .call(TaskCreate {
                project_id,
                name: name.into(),
            })
            .await
    }

    pub async fn tasks_lists_by_project_id(&self, project_id: RecordId) -> BridgeResult<Vec<Task>> {
        self.boundary.call(TasksListsByProjectId { project_id }).await
    }

    pub async fn tasks_list_active_by_project_id(
        &self,
        project_id: RecordId,
    ) -> BridgeResult<Vec<Task>> {
        self.boundary
            .call(TasksListActiveByProjectId { project_id })
            .await
    }

    pub async fn task_get(&self, task_id: RecordId) -> BridgeResult<Option<Task>> {
        self.boundary.call(TaskGet { task_id }).await
    }

    pub async fn task_update(
        &self,
        task_id: RecordId,
        name: Option<String>,
        status: Option<TaskStatus>,
    ) -> BridgeResult<Option<Task>> {
        self.boundary
            .call(TaskUpdate {
                task_id,
                name,
                status,
            })
            .await
    }

    pub async fn task_destroy(&self, task_id: RecordId) -> BridgeResult<bool> {
        self.boundary.call(TaskDestroy { task_id }).await
    }

    pub async fn task_set_status(&self, task_id: RecordId, status: bool) -> BridgeResult<bool> {
        self.boundary.call(TaskSetStatus { task_id, status }).await
    }

    // events

    pub async fn event_create(
        &self,
        task_id: RecordId,
        start_date: Option<String>,
        details: Option<String>,
        notes: Option<String>,
    ) -> BridgeResult<Event> {
        self.boundary
            .call(EventCreate {
                task_id,
                start_date,
                details,
                notes,
            })
            .await
    }

    pub async fn events_get_or_create_by_date(
        &self,
        task_id: RecordId,
        start_date: Option<String>,
    ) -> BridgeResult<Event> {
        self.boundary
            .call(EventsGetOrCreateByDate {
                task_id,
                start_date,
            })
            .await
    }

    pub async fn events_by_task_id(&self, task_id: RecordId) -> BridgeResult<Vec<Event>> {
        self.boundary.call(EventsByTaskId { task_id }).await
    }

    pub async fn event_active_by_task_id(&self, task_id: RecordId) -> BridgeResult<Vec<Event>> {
        self.boundary.call(EventActiveByTaskId { task_id }).await
    }

    pub async fn event_get(&self, event_id: RecordId) -> BridgeResult<Option<Event>> {
        self.boundary.call(EventGet { event_id }).await
    }

    pub async fn event_get_by_date(
        &self,
        task_id: RecordId,
        event_date: Option<String>,
    ) -> BridgeResult<Option<Event>> {
        self.boundary
            .call(EventGetByDate {
                task_id,
                event_date,
            })
            .await
    }

    pub async fn event_list_dates_by_project_id(
        &self,
        task_id: RecordId,
    ) -> BridgeResult<Vec<EventDate>> {
        self.boundary
            .call(EventListDatesByProjectId { task_id })
            .await
    }

    pub async fn event_update(
        &self,
        event_id: RecordId,
        detail: Option<String>,
        notes: Option<String>,
    ) -> BridgeResult<()> {
        self.boundary
            .call(EventUpdate {
                event_id,
                detail,
                notes,
            })
            .await
    }

    pub async fn event_destroy(&self, event_id: RecordId) -> BridgeResult<bool> {
        self.boundary.call(EventDestroy { event_id }).await
    }

    pub async fn event_add_entry(
        &self,
        event_id: RecordId,
        start_dt: impl Into<String>,
        end_dt: impl Into<String>,
        seconds: u64,
        reason: StopReason,
    ) -> BridgeResult<Entry> {
        self.boundary
            .call(EventAddEntry {
                event_id,
                start_dt: start_dt.into(),
                end_dt: end_dt.into(),
                seconds,
                reason,
            })
            .await
    }

    // entries

    pub async fn entries_lists_by_event_id(&self, event_id: RecordId) -> BridgeResult<Vec<Entry>> {
        self.boundary.call(EntriesListsByEventId { event_id }).await
    }

    pub async fn entry_get(&self, entry_id: RecordId) -> BridgeResult<Option<Entry>> {
        self.boundary.call(EntryGet { entry_id }).await
    }

    pub async fn entry_update(&self, update: EntryUpdate) -> BridgeResult<Entry> {
        self.boundary.call(update).await
    }

    pub async fn entry_destroy(&self, entry_id: RecordId) -> BridgeResult<bool> {
        self.boundary.call(EntryDestroy { entry_id }).await
    }

    pub async fn entry_create(
        &self,
        event_id: RecordId,
        started_on: impl Into<String>,
        stopped_on: impl Into<String>,
        seconds: Option<u64>,
    ) -> BridgeResult<Entry> {
        self.boundary
            .call(EntryCreate {
                event_id,
                started_on: started_on.into(),
                stopped_on: stopped_on.into(),
                seconds,
            })
            .await
    }

    // timer

    pub async fn timer_check(&self) -> BridgeResult<bool> {
        self.boundary.call(TimerCheck).await
    }

    pub async fn timer_owner(&self) -> BridgeResult<Option<TimeOwner>> {
        self.boundary.call(TimerOwner).await
    }

    /// Prefer [`TimerBroker::override_listener`], which also creates the receiving subscription.
    pub async fn timer_override(&self, new_receiver: CorrelationId) -> BridgeResult<()> {
        self.boundary.call(TimerOverride { new_receiver }).await
    }

    /// Prefer [`TimerBroker::start`], which also creates the listener subscription.
    pub async fn timer_start(
        &self,
        listener_id: CorrelationId,
        task_id: RecordId,
    ) -> BridgeResult<Event> {
        self.boundary
            .call(TimerStart {
                listener_id,
                task_id,
            })
            .await
    }

    pub async fn timer_stop(&self) -> BridgeResult<bool> {
        self.boundary.call(TimerStop).await
    }

    pub async fn timer_pause(&self) -> BridgeResult<bool> {
        self.boundary.call(TimerPause).await
    }

    pub async fn timer_resume(&self) -> BridgeResult<bool> {
        self.boundary.call(TimerResume).await
    }

    // shortcuts

    pub async fn shortcut_get_all(&self) -> BridgeResult<Vec<Shortcut>> {
        self.boundary.call(ShortcutGetAll).await
    }

    pub async fn shortcut_get(&self, shortcut_id: RecordId) -> BridgeResult<Shortcut> {
        self.boundary.call(ShortcutGet { shortcut_id }).await
    }

    pub async fn shortcut_add(
        &self,
        client_id: RecordId,
        project_id: RecordId,
        task_id: RecordId,
    ) -> BridgeResult<Shortcut> {
        self.boundary
            .call(ShortcutAdd {
                client_id,
                project_id,
                task_id,
            })
            .await
    }

    // windows

    pub async fn open_window(&self, win_name: impl Into<String>) -> BridgeResult<bool> {
        self.boundary
            .call(OpenWindow {
                win_name: win_name.into(),
            })
            .await
    }

    pub async fn window_toggle_resize(
        &self,
        win_name: impl Into<String>,
        size: impl Into<String>,
    ) -> BridgeResult<bool> {
        self.boundary
            .call(WindowToggleResize {
                win_name: win_name.into(),
                size: size.into(),
            })
            .await
    }

    // reports

    pub async fn report_generate(&self, payload: ReportPayload) -> BridgeResult<TimeReport> {
        self.boundary.call(ReportGenerate { payload }).await
    }

    pub async fn report_build2text(&self, payload: ReportPayload) -> BridgeResult<String> {
        self.boundary.call(ReportBuild2text { payload }).await
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
