//! One struct per backend method. Fields are the method's positional arguments, in order.

use minder_bridge_derive::RemoteOperation;

use super::types::{
    Client, Entry, Event, EventDate, Project, RecordId, ReportPayload, Shortcut, StopReason, Task,
    TaskStatus, TimeOwner, TimeReport,
};
use crate::correlation::CorrelationId;

/// Writes `message` to the backend's log.
#[derive(Clone, Debug, RemoteOperation)]
pub struct Info {
    pub message: Option<String>,
}

#[derive(Clone, Debug, RemoteOperation)]
pub struct TitleSet {
    pub new_title: String,
}

// clients
// -------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Client)]
pub struct ClientCreate {
    pub name: String,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Client>)]
pub struct ClientsList;

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Client>)]
pub struct ClientListActive;

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Client>)]
pub struct ClientGet {
    pub client_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Client>)]
pub struct ClientUpdate {
    pub client_id: RecordId,
    pub client_name: String,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct ClientDestroy {
    pub client_id: RecordId,
}

// projects
// -------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Project)]
pub struct ProjectCreate {
    pub client_id: RecordId,
    pub name: String,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Project>)]
pub struct ProjectsListByClientId {
    pub client_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Project>)]
pub struct ProjectsListActiveByClientId {
    pub client_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Project>)]
pub struct ProjectGet {
    pub project_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Project>)]
pub struct ProjectUpdate {
    pub project_id: RecordId,
    pub project_name: String,
}

/// Inactive projects drop out of the active listings but keep their time.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Project)]
pub struct ProjectSetStatus {
    pub project_id: RecordId,
    pub status: bool,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct ProjectDestroy {
    pub project_id: RecordId,
}

// tasks
// -------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Task)]
pub struct TaskCreate {
    pub project_id: RecordId,
    pub name: String,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Task>)]
pub struct TasksListsByProjectId {
    pub project_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Task>)]
pub struct TasksListActiveByProjectId {
    pub project_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Task>)]
pub struct TaskGet {
    pub task_id: RecordId,
}

/// `None` fields are left untouched by the backend.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Task>)]
pub struct TaskUpdate {
    pub task_id: RecordId,
    pub name: Option<String>,
    pub status: Option<TaskStatus>,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct TaskDestroy {
    pub task_id: RecordId,
}

/// Hides a task from the active listings. Its time still counts.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct TaskSetStatus {
    pub task_id: RecordId,
    pub status: bool,
}

// events
// -------------------------------------------------------------------------------------------------------

/// `start_date` defaults to today on the backend.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Event)]
pub struct EventCreate {
    pub task_id: RecordId,
    pub start_date: Option<String>,
    pub details: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Event)]
pub struct EventsGetOrCreateByDate {
    pub task_id: RecordId,
    pub start_date: Option<String>,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Event>)]
pub struct EventsByTaskId {
    pub task_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Event>)]
pub struct EventActiveByTaskId {
    pub task_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Event>)]
pub struct EventGet {
    pub event_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Event>)]
pub struct EventGetByDate {
    pub task_id: RecordId,
    pub event_date: Option<String>,
}

/// Despite the name, the backend keys this listing by task.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<EventDate>)]
pub struct EventListDatesByProjectId {
    pub task_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
pub struct EventUpdate {
    pub event_id: RecordId,
    pub detail: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct EventDestroy {
    pub event_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Entry)]
pub struct EventAddEntry {
    pub event_id: RecordId,
    pub start_dt: String,
    pub end_dt: String,
    pub seconds: u64,
    pub reason: StopReason,
}

// entries
// -------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Entry>)]
pub struct EntriesListsByEventId {
    pub event_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<Entry>)]
pub struct EntryGet {
    pub entry_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Entry)]
pub struct EntryUpdate {
    pub entry_id: RecordId,
    pub start_dt: Option<String>,
    pub end_dt: Option<String>,
    pub seconds: Option<u64>,
    pub reason: Option<StopReason>,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct EntryDestroy {
    pub entry_id: RecordId,
}

/// Without `seconds` the backend takes the difference between the two timestamps.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Entry)]
pub struct EntryCreate {
    pub event_id: RecordId,
    pub started_on: String,
    pub stopped_on: String,
    pub seconds: Option<u64>,
}

// timer
// -------------------------------------------------------------------------------------------------------

/// `true` while a timer is running.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct TimerCheck;

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Option<TimeOwner>)]
pub struct TimerOwner;

/// Redirects ticks to `new_receiver`. The backend ends the old receiver's subscription.
#[derive(Clone, Debug, RemoteOperation)]
pub struct TimerOverride {
    pub new_receiver: CorrelationId,
}

/// Starts ticking into `listener_id`, on today's event of `task_id`.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Event)]
pub struct TimerStart {
    pub listener_id: CorrelationId,
    pub task_id: RecordId,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct TimerStop;

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct TimerPause;

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct TimerResume;

// shortcuts
// -------------------------------------------------------------------------------------------------------

/// Newest first.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Vec<Shortcut>)]
pub struct ShortcutGetAll;

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Shortcut)]
pub struct ShortcutGet {
    pub shortcut_id: RecordId,
}

/// Returns the existing shortcut when the triple is already saved.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = Shortcut)]
pub struct ShortcutAdd {
    pub client_id: RecordId,
    pub project_id: RecordId,
    pub task_id: RecordId,
}

// windows
// -------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct OpenWindow {
    pub win_name: String,
}

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = bool)]
pub struct WindowToggleResize {
    pub win_name: String,
    pub size: String,
}

// reports
// -------------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = TimeReport)]
pub struct ReportGenerate {
    pub payload: ReportPayload,
}

/// The report rendered as plain text, with earnings when the payload carries a wage.
#[derive(Clone, Debug, RemoteOperation)]
#[remote(response = String)]
pub struct ReportBuild2text {
    pub payload: ReportPayload,
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
