fn main() {
    if let Err(err) = subway_map_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
