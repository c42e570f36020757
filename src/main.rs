use anyhow::Result;

fn main() -> Result<()> {
    readme_gen::cli::run()
}
