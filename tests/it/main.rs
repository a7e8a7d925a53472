mod util;

mod cursors;
mod scalars;
