//! Task Card Component

use leptos::prelude::*;
use leptos_dragdrop::{make_on_card_mousedown, DndSignals};

use crate::board::BoardState;
use crate::models::{Task, TaskStatus};

/// One draggable task; cards with an update in flight can't be picked up
#[component]
pub fn TaskCard(task: Task, column: TaskStatus, state: RwSignal<BoardState>, dnd: DndSignals) -> impl IntoView {
    let id = task.id.clone();
    let on_mousedown = make_on_card_mousedown(dnd, id.clone(), column.as_str().to_string());

    let busy = {
        let id = id.clone();
        move || state.with(|state| state.is_moving(&id))
    };
    let card_class = {
        let id = id.clone();
        let busy = busy.clone();
        move || {
            let mut c = String::from("task-card");
            if busy() { c.push_str(" busy"); }
            if dnd.is_dragging(&id) { c.push_str(" dragging"); }
            c
        }
    };
    let on_mousedown = {
        let id = id.clone();
        move |ev: web_sys::MouseEvent| {
            if !state.with_untracked(|state| state.is_moving(&id)) {
                on_mousedown(ev);
            }
        }
    };

    let completed_on = task
        .completion_date_time
        .filter(|_| column == TaskStatus::Completed)
        .map(|at| at.format("%Y-%m-%d").to_string());

    view! {
        <div class=card_class on:mousedown=on_mousedown>
            <h3 class="task-title">{task.title().to_string()}</h3>
            <p class="task-meta">"Category: " {task.category().to_string()}</p>
            <p class="task-meta">"Subcategory: " {task.sub_category().to_string()}</p>
            <p class="task-meta">"Location: " {task.location().to_string()}</p>
            {task.salary().map(|salary| view! { <p class="task-meta">"Salary: " {salary.to_string()}</p> })}
            <p class="task-status">"Status: " {column.label()}</p>
            {completed_on.map(|day| view! { <p class="task-meta">"Completed: " {day}</p> })}
            <Show when=busy>
                <span class="task-saving">"Saving..."</span>
            </Show>
        </div>
    }
}
