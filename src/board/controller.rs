//! Board Controller
//!
//! Loads a helper's tasks and drives drag-initiated status changes against
//! the backend. State lives in a [`StateCell`] so the UI can observe it.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::optimistic::{Focus, Optimistic, StateCell};
use super::task_board::{TaskBoard, TransitionPolicy};
use crate::api::TaskApi;
use crate::error::BoardError;
use crate::models::{StatusUpdate, Task, TaskStatus};

/// Everything the board view renders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardState {
    pub board: TaskBoard,
    pub loading: bool,
    /// User-visible error banner
    pub error: Option<String>,
    /// Tasks whose status update has not resolved yet
    pub moving: BTreeSet<String>,
}

impl BoardState {
    pub fn is_moving(&self, task_id: &str) -> bool {
        self.moving.contains(task_id)
    }
}

fn board_of(state: &BoardState) -> &TaskBoard {
    &state.board
}

fn board_of_mut(state: &mut BoardState) -> &mut TaskBoard {
    &mut state.board
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// A newer load started (or the view went away) before this one finished
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Source and destination are the same column
    Unchanged,
    /// Refused by the transition policy
    Forbidden,
    /// The task already has an update in flight
    Busy,
    /// Task is not in the source column; the board is stale
    NotFound,
    /// Backend accepted the new status
    Committed(Task),
    /// Backend refused; the task is back in its source column
    RolledBack(BoardError),
    /// The view went away before the backend answered
    Detached,
}

pub struct BoardController<A, C> {
    api: Rc<A>,
    state: C,
    policy: TransitionPolicy,
    generation: Rc<Cell<u64>>,
    detached: Rc<Cell<bool>>,
    /// Bumped every time a load replaces the board
    board_version: Rc<Cell<u64>>,
    last_helper: Rc<RefCell<Option<String>>>,
}

impl<A, C: Clone> Clone for BoardController<A, C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
            policy: self.policy,
            generation: self.generation.clone(),
            detached: self.detached.clone(),
            board_version: self.board_version.clone(),
            last_helper: self.last_helper.clone(),
        }
    }
}

impl<A: TaskApi, C: StateCell<BoardState>> BoardController<A, C> {
    pub fn new(api: A, state: C, policy: TransitionPolicy) -> Self {
        Self {
            api: Rc::new(api),
            state,
            policy,
            generation: Rc::new(Cell::new(0)),
            detached: Rc::new(Cell::new(false)),
            board_version: Rc::new(Cell::new(0)),
            last_helper: Rc::new(RefCell::new(None)),
        }
    }

    pub fn state(&self) -> &C {
        &self.state
    }

    /// Load for the signed-in helper, if the session names one
    ///
    /// A blank or missing email sets the error banner instead of leaving
    /// the board silently empty.
    pub async fn load_for(&self, helper: Option<&str>) -> Result<LoadOutcome, BoardError> {
        let helper = helper.map(str::trim).filter(|helper| !helper.is_empty());
        match helper {
            Some(helper) => self.load(helper).await,
            None => {
                if self.detached.get() {
                    return Ok(LoadOutcome::Stale);
                }
                let err = BoardError::NotAuthenticated;
                warn!("no helper email on the session, not loading tasks");
                self.state.modify(|state| {
                    state.loading = false;
                    state.error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    /// Fetch the helper's tasks and replace the whole board
    ///
    /// Safe to call again for a manual refresh; only the most recent call
    /// is allowed to write its result. Tasks with an update in flight stay
    /// busy across the replacement.
    pub async fn load(&self, helper: &str) -> Result<LoadOutcome, BoardError> {
        if self.detached.get() {
            return Ok(LoadOutcome::Stale);
        }
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        *self.last_helper.borrow_mut() = Some(helper.to_string());
        self.state.modify(|state| state.loading = true);

        info!(helper, "fetching tasks");
        let result = self.api.list_helper_tasks(helper).await;

        if self.detached.get() || self.generation.get() != generation {
            debug!(generation, "discarding stale task list");
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(tasks) => {
                let board = TaskBoard::from_tasks(tasks);
                let count = board.len();
                self.state.modify(|state| {
                    state.board = board;
                    state.loading = false;
                    state.error = None;
                });
                self.board_version.set(self.board_version.get() + 1);
                debug!(count, "board replaced");
                Ok(LoadOutcome::Loaded(count))
            }
            Err(err) => {
                let err = BoardError::from(err);
                error!(error = %err, "task fetch failed");
                self.state.modify(|state| {
                    state.loading = false;
                    state.error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    /// Re-run the last `load`
    pub async fn refresh(&self) -> Option<Result<LoadOutcome, BoardError>> {
        let helper = self.last_helper.borrow().clone()?;
        Some(self.load(&helper).await)
    }

    /// Move a task between columns, optimistically
    ///
    /// The board changes before the backend is contacted. If the backend
    /// refuses, the board is restored to exactly what it was before this
    /// move and the error banner is set. When a load replaced the board in
    /// the meantime only this task is put back, so the fresh list survives.
    pub async fn move_task(&self, task_id: &str, from: TaskStatus, to: TaskStatus) -> MoveOutcome {
        if from == to {
            return MoveOutcome::Unchanged;
        }
        if self.detached.get() {
            return MoveOutcome::Detached;
        }
        if !self.policy.permits(from, to) {
            debug!(task = task_id, %from, %to, "transition not allowed");
            return MoveOutcome::Forbidden;
        }
        if self.state.with_state(|state| state.is_moving(task_id)) {
            debug!(task = task_id, "update already in flight");
            return MoveOutcome::Busy;
        }

        let now = Utc::now();
        let board = Focus::new(&self.state, board_of, board_of_mut);
        let Some((txn, moved)) = Optimistic::begin(&board, |board: &mut TaskBoard| board.move_task(task_id, from, to, now)) else {
            warn!(task = task_id, column = %from, "task not in source column, board is stale");
            return MoveOutcome::NotFound;
        };
        self.state.modify(|state| {
            state.moving.insert(task_id.to_string());
        });

        let update = StatusUpdate {
            status: to,
            completion_date_time: (to == TaskStatus::Completed).then_some(now),
        };
        let version = self.board_version.get();
        let result = self.api.update_task_status(task_id, &update).await;

        if self.detached.get() {
            txn.commit();
            return MoveOutcome::Detached;
        }
        self.state.modify(|state| {
            state.moving.remove(task_id);
        });

        match result {
            Ok(()) => {
                info!(task = task_id, %to, "task status updated");
                txn.commit();
                MoveOutcome::Committed(moved)
            }
            Err(err) => {
                let err = BoardError::Update(err.user_message());
                error!(task = task_id, error = %err, "status update failed, rolling back");
                if self.board_version.get() == version {
                    txn.rollback(&board);
                } else {
                    let original = txn.snapshot().get(task_id).cloned();
                    txn.commit();
                    if let Some(original) = original {
                        self.state.modify(|state| {
                            state.board.restore(original, from);
                        });
                    }
                }
                self.state.modify(|state| state.error = Some(err.to_string()));
                MoveOutcome::RolledBack(err)
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.modify(|state| state.error = None);
    }

    /// Stop writing to the state; pending requests finish silently
    pub fn detach(&self) {
        self.detached.set(true);
        self.generation.set(self.generation.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::task_board::task;
    use crate::error::{ApiError, ApiResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    type Shared = Rc<RefCell<BoardState>>;

    /// Scripted backend that records what the board looked like when called
    #[derive(Default)]
    struct FakeApi {
        lists: RefCell<VecDeque<ApiResult<Vec<Task>>>>,
        updates: RefCell<VecDeque<ApiResult<()>>>,
        calls: RefCell<Vec<(String, StatusUpdate)>>,
        observed: RefCell<Vec<BoardState>>,
        state: RefCell<Option<Shared>>,
        on_list: RefCell<Option<Box<dyn Fn()>>>,
        /// Scheduler turns a status update waits before answering
        yields: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl TaskApi for FakeApi {
        async fn list_helper_tasks(&self, _helper: &str) -> ApiResult<Vec<Task>> {
            if let Some(hook) = self.on_list.borrow_mut().take() {
                hook();
            }
            self.lists.borrow_mut().pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn update_task_status(&self, task_id: &str, update: &StatusUpdate) -> ApiResult<()> {
            if let Some(state) = self.state.borrow().as_ref() {
                self.observed.borrow_mut().push(state.borrow().clone());
            }
            self.calls.borrow_mut().push((task_id.to_string(), update.clone()));
            for _ in 0..self.yields.get() {
                tokio::task::yield_now().await;
            }
            self.updates.borrow_mut().pop_front().unwrap_or(Ok(()))
        }
    }

    fn three_tasks() -> Vec<Task> {
        vec![task("t1", "pending"), task("t2", "in-progress"), task("t3", "completed")]
    }

    fn controller(api: FakeApi, policy: TransitionPolicy) -> (BoardController<FakeApi, Shared>, Shared) {
        let state: Shared = Rc::new(RefCell::new(BoardState::default()));
        *api.state.borrow_mut() = Some(state.clone());
        (BoardController::new(api, state.clone(), policy), state)
    }

    async fn loaded(policy: TransitionPolicy) -> (BoardController<FakeApi, Shared>, Shared) {
        let api = FakeApi::default();
        api.lists.borrow_mut().push_back(Ok(three_tasks()));
        let (ctrl, state) = controller(api, policy);
        assert_eq!(ctrl.load("a@x.com").await, Ok(LoadOutcome::Loaded(3)));
        (ctrl, state)
    }

    fn column_ids_of(board: &TaskBoard, status: TaskStatus) -> Vec<String> {
        board.column(status).iter().map(|t| t.id.clone()).collect()
    }

    fn column_ids(state: &Shared, status: TaskStatus) -> Vec<String> {
        column_ids_of(&state.borrow().board, status)
    }

    fn occurrences(state: &Shared, id: &str) -> usize {
        TaskStatus::ALL.iter().filter(|s| column_ids(state, **s).iter().any(|t| t == id)).count()
    }

    #[tokio::test]
    async fn test_load_partitions_by_status() {
        let (_ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        for status in TaskStatus::ALL {
            assert_eq!(state.borrow().board.column(status).len(), 1);
        }
        assert!(!state.borrow().loading);
        assert!(state.borrow().error.is_none());
    }

    #[tokio::test]
    async fn test_load_malformed_keeps_board() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        let before = state.borrow().board.clone();
        ctrl.api.lists.borrow_mut().push_back(Err(ApiError::malformed("expected an array of tasks")));

        assert_eq!(ctrl.load("a@x.com").await, Err(BoardError::MalformedResponse));
        let state = state.borrow();
        assert_eq!(state.board, before);
        assert_eq!(state.error.as_deref(), Some("Invalid task data format from server"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_load_failure_sets_banner() {
        let api = FakeApi::default();
        api.lists.borrow_mut().push_back(Err(ApiError::Status { status: 500, message: "db down".to_string() }));
        let (ctrl, state) = controller(api, TransitionPolicy::AllowAll);
        assert!(ctrl.load("a@x.com").await.is_err());
        assert_eq!(state.borrow().error.as_deref(), Some("Failed to load tasks: db down"));
    }

    #[tokio::test]
    async fn test_refresh_replaces_board_and_clears_error() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        state.borrow_mut().error = Some("old".to_string());
        ctrl.api.lists.borrow_mut().push_back(Ok(vec![task("t9", "completed")]));

        assert_eq!(ctrl.refresh().await, Some(Ok(LoadOutcome::Loaded(1))));
        assert_eq!(column_ids(&state, TaskStatus::Completed), vec!["t9"]);
        assert!(column_ids(&state, TaskStatus::Pending).is_empty());
        assert!(state.borrow().error.is_none());
    }

    #[tokio::test]
    async fn test_superseded_load_is_discarded() {
        let api = FakeApi::default();
        api.lists.borrow_mut().push_back(Ok(vec![task("old", "pending")]));
        let (ctrl, state) = controller(api, TransitionPolicy::AllowAll);

        // A newer load starts while the first request is outstanding
        let newer = ctrl.clone();
        *ctrl.api.on_list.borrow_mut() = Some(Box::new(move || newer.generation.set(newer.generation.get() + 1)));

        assert_eq!(ctrl.load("a@x.com").await, Ok(LoadOutcome::Stale));
        assert!(state.borrow().board.is_empty());
    }

    #[tokio::test]
    async fn test_move_is_visible_before_backend_answers() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;

        let outcome = ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Completed).await;
        assert!(matches!(outcome, MoveOutcome::Committed(ref t) if t.status == "completed"));

        let observed = ctrl.api.observed.borrow();
        let seen = &observed[0];
        assert!(seen.board.column(TaskStatus::Pending).is_empty());
        let moved = seen.board.get("t1").unwrap();
        assert_eq!(seen.board.locate("t1"), Some(TaskStatus::Completed));
        assert!(moved.completion_date_time.is_some());
        assert!(seen.is_moving("t1"));

        assert!(!state.borrow().is_moving("t1"));
        let calls = ctrl.api.calls.borrow();
        let (id, update) = &calls[0];
        assert_eq!(id, "t1");
        assert_eq!(update.status, TaskStatus::Completed);
        assert_eq!(update.completion_date_time, moved.completion_date_time);
    }

    #[tokio::test]
    async fn test_move_without_completion_sends_no_timestamp() {
        let (ctrl, _state) = loaded(TransitionPolicy::AllowAll).await;
        ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::InProgress).await;
        assert_eq!(ctrl.api.calls.borrow()[0].1.completion_date_time, None);
    }

    #[tokio::test]
    async fn test_round_trip_restores_status() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;

        ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::InProgress).await;
        assert_eq!(occurrences(&state, "t1"), 1);
        assert_eq!(column_ids(&state, TaskStatus::InProgress), vec!["t2", "t1"]);

        ctrl.move_task("t1", TaskStatus::InProgress, TaskStatus::Pending).await;
        assert_eq!(occurrences(&state, "t1"), 1);
        assert_eq!(state.borrow().board.get("t1").unwrap().status, "pending");
        for seen in ctrl.api.observed.borrow().iter() {
            assert_eq!(TaskStatus::ALL.iter().filter(|s| seen.board.column(**s).iter().any(|t| t.id == "t1")).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_failed_move_rolls_back_whole_board() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        let before = state.borrow().board.clone();
        ctrl.api.updates.borrow_mut().push_back(Err(ApiError::transport("offline")));

        let outcome = ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Completed).await;
        assert_eq!(outcome, MoveOutcome::RolledBack(BoardError::Update("offline".to_string())));

        let state = state.borrow();
        assert_eq!(state.board, before);
        assert_eq!(state.error.as_deref(), Some("Failed to update task status: offline"));
        assert!(state.moving.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_during_failed_move_keeps_fresh_board() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        ctrl.api.yields.set(3);
        ctrl.api.updates.borrow_mut().push_back(Err(ApiError::transport("offline")));
        ctrl.api
            .lists
            .borrow_mut()
            .push_back(Ok(vec![task("t1", "pending"), task("t2", "in-progress"), task("new", "pending")]));

        let refresher = ctrl.clone();
        let (outcome, (refreshed, busy_after_refresh)) = tokio::join!(
            ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Completed),
            async {
                let refreshed = refresher.refresh().await;
                (refreshed, state.borrow().is_moving("t1"))
            }
        );

        assert_eq!(refreshed, Some(Ok(LoadOutcome::Loaded(3))));
        assert!(busy_after_refresh);
        assert_eq!(outcome, MoveOutcome::RolledBack(BoardError::Update("offline".to_string())));

        let state = state.borrow();
        assert!(state.board.get("new").is_some());
        assert!(state.board.get("t3").is_none());
        assert_eq!(state.board.locate("t1"), Some(TaskStatus::Pending));
        assert_eq!(column_ids_of(&state.board, TaskStatus::Pending), vec!["t1", "new"]);
        assert!(state.moving.is_empty());
        assert_eq!(state.error.as_deref(), Some("Failed to update task status: offline"));
    }

    #[tokio::test]
    async fn test_refresh_after_move_started_restores_only_that_task() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        ctrl.api.yields.set(3);
        ctrl.api.updates.borrow_mut().push_back(Err(ApiError::transport("offline")));
        // The refreshed list already shows the optimistic status
        ctrl.api
            .lists
            .borrow_mut()
            .push_back(Ok(vec![task("t1", "completed"), task("t4", "in-progress")]));

        let refresher = ctrl.clone();
        let (outcome, _) = tokio::join!(
            ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Completed),
            refresher.refresh()
        );

        assert!(matches!(outcome, MoveOutcome::RolledBack(_)));
        assert_eq!(column_ids(&state, TaskStatus::Pending), vec!["t1"]);
        assert_eq!(column_ids(&state, TaskStatus::InProgress), vec!["t4"]);
        assert!(column_ids(&state, TaskStatus::Completed).is_empty());
        assert_eq!(state.borrow().board.get("t1").unwrap().status, "pending");
    }

    #[tokio::test]
    async fn test_load_without_helper_sets_banner() {
        let (ctrl, state) = controller(FakeApi::default(), TransitionPolicy::AllowAll);
        state.borrow_mut().loading = true;

        assert_eq!(ctrl.load_for(None).await, Err(BoardError::NotAuthenticated));
        assert!(!state.borrow().loading);
        assert_eq!(state.borrow().error.as_deref(), Some("User not authenticated"));

        ctrl.clear_error();
        assert_eq!(ctrl.load_for(Some("  ")).await, Err(BoardError::NotAuthenticated));
        assert!(state.borrow().error.is_some());
        assert_eq!(ctrl.refresh().await, None);

        ctrl.api.lists.borrow_mut().push_back(Ok(three_tasks()));
        assert_eq!(ctrl.load_for(Some(" a@x.com ")).await, Ok(LoadOutcome::Loaded(3)));
        assert_eq!(ctrl.last_helper.borrow().as_deref(), Some("a@x.com"));
        assert!(state.borrow().error.is_none());
    }

    #[tokio::test]
    async fn test_same_column_is_noop() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        let before = state.borrow().clone();
        assert_eq!(ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Pending).await, MoveOutcome::Unchanged);
        assert_eq!(*state.borrow(), before);
        assert!(ctrl.api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_stale_source_column_is_noop() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        let before = state.borrow().clone();
        assert_eq!(ctrl.move_task("t2", TaskStatus::Pending, TaskStatus::Completed).await, MoveOutcome::NotFound);
        assert_eq!(ctrl.move_task("zz", TaskStatus::Pending, TaskStatus::Completed).await, MoveOutcome::NotFound);
        assert_eq!(*state.borrow(), before);
        assert!(ctrl.api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_forward_only_refuses_backward_moves() {
        let (ctrl, state) = loaded(TransitionPolicy::ForwardOnly).await;
        let before = state.borrow().clone();
        assert_eq!(ctrl.move_task("t3", TaskStatus::Completed, TaskStatus::Pending).await, MoveOutcome::Forbidden);
        assert_eq!(*state.borrow(), before);

        let outcome = ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Completed).await;
        assert!(matches!(outcome, MoveOutcome::Committed(_)));
    }

    #[tokio::test]
    async fn test_card_in_flight_is_not_draggable() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        state.borrow_mut().moving.insert("t1".to_string());
        assert_eq!(ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Completed).await, MoveOutcome::Busy);
        assert_eq!(column_ids(&state, TaskStatus::Pending), vec!["t1"]);
    }

    #[tokio::test]
    async fn test_detached_controller_leaves_state_alone() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        ctrl.detach();
        let before = state.borrow().clone();
        ctrl.api.lists.borrow_mut().push_back(Ok(Vec::new()));
        assert_eq!(ctrl.load("a@x.com").await, Ok(LoadOutcome::Stale));
        assert_eq!(ctrl.move_task("t1", TaskStatus::Pending, TaskStatus::Completed).await, MoveOutcome::Detached);
        assert_eq!(*state.borrow(), before);
    }

    #[tokio::test]
    async fn test_clear_error() {
        let (ctrl, state) = loaded(TransitionPolicy::AllowAll).await;
        state.borrow_mut().error = Some("boom".to_string());
        ctrl.clear_error();
        assert!(state.borrow().error.is_none());
    }
}
