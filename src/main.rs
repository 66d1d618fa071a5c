fn main() {
    milagold::cli::run();
}
