mod core;
mod page;

pub use page::get_dashboard_page;
