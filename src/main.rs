fn main() {
    if let Err(err) = column_graph_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
