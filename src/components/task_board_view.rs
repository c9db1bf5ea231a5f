//! Helper Task Board Component
//!
//! Three status columns with drag-and-drop between them.
//! Uses leptos-dragdrop; columns are the drop targets.

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use tracing::debug;

use leptos_dragdrop::*;

use crate::api::HttpApi;
use crate::auth::profile_email;
use crate::board::{BoardController, BoardState};
use crate::components::TaskCard;
use crate::context::use_app_context;
use crate::models::TaskStatus;
use crate::store::AppStateStoreFields;

type Controller = BoardController<HttpApi, RwSignal<BoardState>>;

#[component]
pub fn HelperTasks() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;
    let state = RwSignal::new(BoardState::default());
    let controller: StoredValue<Controller, LocalStorage> =
        StoredValue::new_local(BoardController::new(ctx.api(), state, ctx.config().transition_policy));

    // Load once the session settles; a token without an email asks /auth/me
    let helper = Memo::new(move |_| {
        store
            .session()
            .with(|session| session.is_authenticated().then(|| session.email().map(str::to_string)))
    });
    Effect::new(move |_| {
        let Some(email) = helper.get() else { return };
        let Some(ctrl) = controller.try_get_value() else { return };
        let profile_api = email.is_none().then(|| ctx.api());
        spawn_local(async move {
            let email = match (email, profile_api) {
                (Some(email), _) => Some(email),
                (None, Some(api)) => profile_email(&api).await,
                (None, None) => None,
            };
            let _ = ctrl.load_for(email.as_deref()).await;
        });
    });

    on_cleanup(move || {
        let _ = controller.try_with_value(|ctrl| ctrl.detach());
    });

    let dnd = create_dnd_signals();
    bind_global_mouseup(dnd, move |source, column| {
        let (Some(from), Some(to)) = (TaskStatus::parse(&source.column), TaskStatus::parse(&column)) else {
            return;
        };
        let Some(ctrl) = controller.try_get_value() else { return };
        spawn_local(async move {
            let outcome = ctrl.move_task(&source.card_id, from, to).await;
            debug!(task = %source.card_id, ?outcome, "drop handled");
        });
    });

    let on_refresh = move |_| {
        let Some(ctrl) = controller.try_get_value() else { return };
        spawn_local(async move {
            let _ = ctrl.refresh().await;
        });
    };
    let on_dismiss = move |_| {
        controller.with_value(|ctrl| ctrl.clear_error());
    };

    view! {
        <section class="task-board-page">
            <header class="task-board-header">
                <h1>"My Tasks"</h1>
                <button class="refresh-btn" disabled=move || state.with(|s| s.loading) on:click=on_refresh>
                    "Refresh"
                </button>
            </header>

            {move || state.with(|s| s.error.clone()).map(|msg| view! {
                <div class="error-banner" role="alert">
                    <span>{msg}</span>
                    <button class="dismiss" on:click=on_dismiss>"×"</button>
                </div>
            })}

            <Show when=move || state.with(|s| s.loading)>
                <p class="task-board-loading">"Loading tasks..."</p>
            </Show>

            <div class="task-board">
                {TaskStatus::ALL
                    .into_iter()
                    .map(|status| view! { <TaskColumn status=status state=state dnd=dnd /> })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
fn TaskColumn(status: TaskStatus, state: RwSignal<BoardState>, dnd: DndSignals) -> impl IntoView {
    let column = status.as_str();
    let on_mouseenter = make_on_column_mouseenter(dnd, column.to_string());
    let on_mouseleave = make_on_mouseleave(dnd);

    let column_class = move || {
        let mut c = format!("task-column {}", column);
        if dnd.is_drop_column(column) { c.push_str(" drop-target"); }
        c
    };
    let count = move || state.with(|s| s.board.column(status).len());

    view! {
        <div class=column_class on:mouseenter=on_mouseenter on:mouseleave=on_mouseleave>
            <h2>{status.label()} " (" {count} ")"</h2>
            <For
                each=move || state.with(|s| s.board.column(status).to_vec())
                key=|task| task.id.clone()
                children=move |task| view! { <TaskCard task=task column=status state=state dnd=dnd /> }
            />
            <Show when=move || count() == 0>
                <p class="task-column-empty">"No tasks"</p>
            </Show>
        </div>
    }
}
