use storeview::output::console;

fn main() {
    if let Err(e) = storeview::app::run_cli() {
        console::error(&e);
        std::process::exit(1);
    }
}
