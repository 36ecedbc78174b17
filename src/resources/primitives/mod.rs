pub mod page;

pub use page::{PageTemplate, build_page_template, material_slot};
