fn main() {
    if let Err(error) = habit_tracker_lib::run() {
        log::error!("habit tracker failed: {error}");
        eprintln!("habit-tracker: {error}");
        std::process::exit(1);
    }
}
