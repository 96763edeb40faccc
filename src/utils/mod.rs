mod fs;

pub use fs::{dir_size, is_dir_empty, read_text_lines};
