fn main() -> anyhow::Result<()> {
    poetry_tui::cli::run()
}
