mod work_history;

pub use work_history::*;
