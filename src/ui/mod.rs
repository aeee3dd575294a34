mod status;
mod table;

pub use status::draw_status_section;
pub use table::{draw_table_view, result_cells};
