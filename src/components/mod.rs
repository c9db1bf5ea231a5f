//! UI Components
//!
//! Pages and reusable Leptos components.

mod auth_page;
mod home_pages;
mod nav_bar;
mod protected_route;
mod task_board_view;
mod task_card;

pub use auth_page::{AuthPage, AuthTab};
pub use home_pages::{HelperHome, Landing, SeekerHome};
pub use nav_bar::NavBar;
pub use protected_route::ProtectedRoute;
pub use task_board_view::HelperTasks;
pub use task_card::TaskCard;
