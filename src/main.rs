//! rTimebill main entrypoint.

use rtimebill::run;
use rtimebill::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        // 1: the request was rejected, 2: infrastructure failure
        std::process::exit(if e.is_client_error() { 1 } else { 2 });
    }
}
