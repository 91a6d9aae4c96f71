pub mod icons;
pub mod output;
pub mod table;

pub use icons::Icons;
pub use output::{error, header, info, mark, palette, success, warn, Palette};
pub use table::{habits_table, stats_table};
