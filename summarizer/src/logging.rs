use log::Level;

pub fn init_logging() {
    let _ = console_log::init_with_level(Level::Info);
}
