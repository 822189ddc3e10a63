use anyhow::Result;

fn main() -> Result<()> {
    lifeterm::app::run()
}
