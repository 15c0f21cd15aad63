mod input_box;
mod layout;
mod message_area;
mod status_bar;
pub mod theme;
mod topic_bar;

use crate::app::state::AppState;
use ratatui::prelude::*;

pub use message_area::hit_test;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area);

    topic_bar::render(frame, app_layout.topic_bar, state);
    message_area::render(frame, app_layout.message_area, state);
    input_box::render(frame, app_layout.input_box, state);
    status_bar::render(frame, app_layout.status_bar, state);
}
