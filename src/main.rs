//! mealgate main entrypoint.

use mealgate::ui::messages::error;
use mealgate::{init_log, run};

fn main() {
    init_log();
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
